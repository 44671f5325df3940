//! Learning tile rules from an example map
//!
//! A sample is a grid of external tile ids indexed `[y, x]` with `y = 0` at
//! the bottom, matching [`TileMap`](crate::spatial::grid::TileMap). Every
//! ordered pair of neighbouring ids observed in the sample becomes an allowed
//! adjacency in that direction, and each tile's weight is its occurrence
//! count. Cells holding `UNRESOLVED_TILE` are treated as empty and ignored.

use crate::io::error::{AlgorithmError, Result};
use crate::spatial::tiles::{Direction, RuleSet, TileRule, UNRESOLVED_TILE};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Sample map together with the colours its ids were read from
#[derive(Clone, Debug)]
pub struct SampleProcessor {
    sample: Array2<i32>,
    color_mapping: Vec<[u8; 4]>,
}

impl SampleProcessor {
    /// Wrap a sample grid of external ids
    ///
    /// # Errors
    ///
    /// Returns an error if the sample has no cells or only empty cells.
    pub fn from_grid(sample: Array2<i32>) -> Result<Self> {
        if sample.is_empty() {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "sample has no cells".to_owned(),
            });
        }
        if sample.iter().all(|&tile| tile == UNRESOLVED_TILE) {
            return Err(AlgorithmError::InvalidSourceData {
                reason: "sample holds only empty cells".to_owned(),
            });
        }
        Ok(Self {
            sample,
            color_mapping: Vec::new(),
        })
    }

    /// Read a sample from a PNG, one tile id per distinct colour
    ///
    /// Colours are sorted before numbering so the same image always yields
    /// the same ids. Fully transparent pixels are empty cells. The top image
    /// row becomes the highest `y`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file at the given path cannot be opened or decoded
    /// - The image holds no opaque pixel
    pub fn from_png_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let img = image::open(&path_buf).map_err(|e| AlgorithmError::ImageLoad {
            path: path_buf,
            source: e,
        })?;
        let rgba_img = img.to_rgba8();
        let (width, height) = (rgba_img.width() as usize, rgba_img.height() as usize);

        let mut colors: Vec<[u8; 4]> = rgba_img
            .pixels()
            .map(|pixel| pixel.0)
            .filter(|color| color[3] > 0)
            .collect();
        colors.sort_unstable();
        colors.dedup();

        let ids: HashMap<[u8; 4], i32> = colors
            .iter()
            .enumerate()
            .map(|(index, &color)| (color, index as i32))
            .collect();

        let mut sample = Array2::from_elem((height, width), UNRESOLVED_TILE);
        for (x, y, pixel) in rgba_img.enumerate_pixels() {
            let Some(&id) = ids.get(&pixel.0) else {
                continue;
            };
            let row = height - 1 - y as usize;
            if let Some(cell) = sample.get_mut([row, x as usize]) {
                *cell = id;
            }
        }

        let mut processor = Self::from_grid(sample)?;
        processor.color_mapping = colors;
        Ok(processor)
    }

    /// Sample ids indexed `[y, x]`
    pub const fn sample(&self) -> &Array2<i32> {
        &self.sample
    }

    /// RGBA colour of each id for PNG samples, indexed by id
    pub fn color_mapping(&self) -> &[[u8; 4]] {
        &self.color_mapping
    }

    /// Occurrences of every non-empty id, in ascending id order
    pub fn tile_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for &tile in self.sample.iter().filter(|&&tile| tile != UNRESOLVED_TILE) {
            *counts.entry(tile).or_insert(0) += 1;
        }
        counts
    }

    /// Derive a rule set from every adjacency present in the sample
    ///
    /// Tiles are listed in ascending id order and neighbour lists are sorted.
    pub fn learn_rules(&self) -> RuleSet {
        let mut rules: BTreeMap<i32, TileRule> = self
            .tile_counts()
            .into_iter()
            .map(|(id, count)| (id, TileRule::new(id, count as f64)))
            .collect();

        let (height, width) = self.sample.dim();
        for ((y, x), &tile) in self.sample.indexed_iter() {
            if tile == UNRESOLVED_TILE {
                continue;
            }
            for direction in Direction::ALL {
                let [dx, dy] = direction.offset();
                let nx = x as i64 + i64::from(dx);
                let ny = y as i64 + i64::from(dy);
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let Some(&neighbor) = self.sample.get([ny as usize, nx as usize]) else {
                    continue;
                };
                if neighbor == UNRESOLVED_TILE {
                    continue;
                }
                if let Some(rule) = rules.get_mut(&tile) {
                    rule.neighbors.allow(direction, neighbor);
                }
            }
        }

        let tiles = rules
            .into_values()
            .map(|mut rule| {
                for direction in Direction::ALL {
                    rule.neighbors.get_mut(direction).sort_unstable();
                }
                rule
            })
            .collect();
        RuleSet::new(tiles)
    }
}
