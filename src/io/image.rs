//! PNG export of generated maps

use crate::io::error::{AlgorithmError, Result};
use crate::spatial::grid::TileMap;
use crate::spatial::tiles::UNRESOLVED_TILE;
use image::{Rgba, RgbaImage};

/// Deterministic opaque colour for a tile id without a sample colour
pub const fn palette_color(tile: i32) -> [u8; 4] {
    let mut h = (tile as u32).wrapping_mul(374_761_393) ^ 0x9E37_79B9;
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    [(h >> 16) as u8, (h >> 8) as u8, h as u8, 255]
}

/// Colour of one map cell
///
/// Ids index `color_mapping` when it covers them, other ids fall back to
/// [`palette_color`]. Unresolved cells are fully transparent.
pub fn tile_color(tile: i32, color_mapping: &[[u8; 4]]) -> [u8; 4] {
    if tile == UNRESOLVED_TILE {
        return [0, 0, 0, 0];
    }
    usize::try_from(tile)
        .ok()
        .and_then(|index| color_mapping.get(index).copied())
        .unwrap_or_else(|| palette_color(tile))
}

/// Render a map with each cell as a `scale × scale` square
///
/// The highest `y` becomes the top image row.
pub fn render_map(map: &TileMap, color_mapping: &[[u8; 4]], scale: u32) -> RgbaImage {
    let scale = scale.max(1);
    let width = map.width() as u32 * scale;
    let height = map.height() as u32 * scale;
    RgbaImage::from_fn(width, height, |px, py| {
        let x = (px / scale) as usize;
        let row = (py / scale) as usize;
        let y = map.height().saturating_sub(row + 1);
        let tile = map.get(x, y).unwrap_or(UNRESOLVED_TILE);
        Rgba(tile_color(tile, color_mapping))
    })
}

pub(crate) fn ensure_parent_dir(output_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(output_path).parent() {
        std::fs::create_dir_all(parent).map_err(|e| AlgorithmError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }
    Ok(())
}

/// Export a map as a PNG with one pixel per cell
///
/// An exported PNG can be read back as a sample with the same colours.
///
/// # Errors
///
/// Returns an error if:
/// - The map has no cells
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_map_as_png(
    map: &TileMap,
    color_mapping: &[[u8; 4]],
    output_path: &str,
) -> Result<()> {
    if map.width() == 0 || map.height() == 0 {
        return Err(AlgorithmError::InvalidSourceData {
            reason: "Map has no cells to export".to_string(),
        });
    }

    let img = render_map(map, color_mapping, 1);
    ensure_parent_dir(output_path)?;

    img.save(output_path)
        .map_err(|e| AlgorithmError::ImageExport {
            path: output_path.into(),
            source: e,
        })?;

    Ok(())
}
