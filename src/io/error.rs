//! Error types for rule validation, solver setup and file operations
//!
//! Only conditions that stop a solve from starting are errors. Contradictions
//! found while solving are reported through `SolveStatus` and diagnostics on
//! the solver instead.

use crate::spatial::tiles::Direction;
use std::fmt;
use std::path::PathBuf;

/// Main error type for all algorithm operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Rule set holds too many tiles for the bitset domain
    TooManyTiles {
        /// Number of tiles supplied
        count: usize,
        /// Exclusive upper bound on the tile count
        max: usize,
    },

    /// Rule set holds no tiles
    EmptyRuleSet,

    /// Tile weight is not a finite positive number
    InvalidWeight {
        /// External id of the offending tile
        tile: i32,
        /// Weight that was supplied
        weight: f64,
    },

    /// Same external id appears twice in a rule set
    DuplicateTile {
        /// Repeated external id
        tile: i32,
    },

    /// Neighbour list references an id that is not part of the rule set
    UnknownNeighbor {
        /// Tile whose neighbour list is wrong
        tile: i32,
        /// Id that could not be resolved
        neighbor: i32,
        /// Direction of the neighbour list
        direction: Direction,
    },

    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Source data doesn't meet algorithm requirements
    InvalidSourceData {
        /// Description of what's wrong with the source data
        reason: String,
    },

    /// Algorithm parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Tile index exceeds available tile set
    InvalidTileIndex {
        /// The invalid tile index
        index: usize,
        /// Number of tiles in the set
        max_tiles: usize,
    },

    /// Rule file could not be parsed or written
    RuleFormat {
        /// Path of the rule file
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Failed to save generated image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyTiles { count, max } => {
                write!(
                    f,
                    "Rule set has {count} tiles; at most {} are supported",
                    max.saturating_sub(1)
                )
            }
            Self::EmptyRuleSet => write!(f, "Rule set has no tiles"),
            Self::InvalidWeight { tile, weight } => {
                write!(f, "Tile {tile} has invalid weight {weight}; weights must be positive")
            }
            Self::DuplicateTile { tile } => {
                write!(f, "Tile id {tile} appears more than once in the rule set")
            }
            Self::UnknownNeighbor {
                tile,
                neighbor,
                direction,
            } => {
                write!(
                    f,
                    "Tile {tile} allows unknown neighbour {neighbor} in direction {direction}"
                )
            }
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidTileIndex { index, max_tiles } => {
                write!(f, "Tile index {index} is out of bounds (tiles: {max_tiles})")
            }
            Self::RuleFormat { path, source } => {
                write!(f, "Invalid rule file '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::RuleFormat { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for algorithm results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
