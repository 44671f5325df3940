//! Solver constants and runtime configuration defaults

/// Tile sets must hold strictly fewer tiles than this
pub const MAX_TILE_COUNT: usize = 128;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed grid dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

/// Number of distinct orderings of the four directions
pub const DIRECTION_PERMUTATION_COUNT: usize = 24;

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default map width in cells
pub const DEFAULT_WIDTH: usize = 32;

/// Default map height in cells
pub const DEFAULT_HEIGHT: usize = 32;

/// Default tile id used as block filler and map-edge constraint
pub const DEFAULT_FILLER_TILE: i32 = 0;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 50;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
/// Suffix added to learned rule files
pub const RULES_SUFFIX: &str = "_rules";
/// Delay between GIF animation frames
pub const GIF_FRAME_DELAY_MS: u32 = 5;
/// Minimum frame delay that viewers reliably support (in milliseconds)
pub const VIEWER_MIN_FRAME_DELAY_MS: u32 = 50;
/// Upscaling factor applied to each cell in exported images
pub const EXPORT_CELL_SCALE: u32 = 4;
