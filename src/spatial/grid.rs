//! Cell domains, the row-major solver grid and the external output map
//!
//! [`CellGrid`] stores one [`Cell`] per position in a flat vector indexed by
//! `y * width + x`. Neighbour lookups work on flat indices with explicit edge
//! checks so the propagation loop never builds coordinates.

use crate::algorithm::bitset::TileBitset;
use crate::spatial::tiles::{Direction, TileIndexMap, UNRESOLVED_TILE};
use ndarray::Array2;

/// Candidate set of one grid position
///
/// A cell only ever loses candidates. Once its domain holds one tile it is
/// resolved, once it holds none it is dead; neither state is left again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    domain: TileBitset,
    domain_count: usize,
    selected: Option<usize>,
}

impl Cell {
    /// Cell with the lowest `tile_count` tiles as candidates
    pub const fn full(tile_count: usize) -> Self {
        let domain = TileBitset::full(tile_count);
        let domain_count = domain.count();
        let selected = if domain_count == 1 { domain.first() } else { None };
        Self {
            domain,
            domain_count,
            selected,
        }
    }

    /// Force the domain to exactly `tile`
    ///
    /// An index outside the bitset capacity leaves the cell dead.
    pub const fn collapse_to(&mut self, tile: usize) {
        self.domain = TileBitset::single(tile);
        self.domain_count = self.domain.count();
        self.selected = self.domain.first();
    }

    /// Intersect the domain with `allowed`
    ///
    /// Returns whether any candidate was removed.
    pub const fn constrain(&mut self, allowed: TileBitset) -> bool {
        let narrowed = self.domain.intersection(&allowed);
        if narrowed.bits() == self.domain.bits() {
            return false;
        }
        self.domain = narrowed;
        self.domain_count = narrowed.count();
        self.selected = if self.domain_count == 1 {
            narrowed.first()
        } else {
            None
        };
        true
    }

    /// Remaining candidates
    pub const fn domain(&self) -> TileBitset {
        self.domain
    }

    /// Cached number of remaining candidates
    pub const fn domain_count(&self) -> usize {
        self.domain_count
    }

    /// Resolved tile index, if exactly one candidate remains
    pub const fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Exactly one candidate remains
    pub const fn is_resolved(&self) -> bool {
        self.domain_count == 1
    }

    /// No candidate remains
    pub const fn is_dead(&self) -> bool {
        self.domain_count == 0
    }
}

/// Flat row-major grid of cells
#[derive(Clone, Debug)]
pub struct CellGrid {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl CellGrid {
    /// Create a grid where every cell holds all `tile_count` tiles
    pub fn new(width: usize, height: usize, tile_count: usize) -> Self {
        Self {
            cells: vec![Cell::full(tile_count); width * height],
            width,
            height,
        }
    }

    /// Grid width in cells
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Test if the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of `(x, y)`, if inside the grid
    pub const fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// `[x, y]` position of a flat index
    pub const fn position(&self, index: usize) -> [usize; 2] {
        if self.width == 0 {
            return [0, 0];
        }
        [index % self.width, index / self.width]
    }

    /// Flat index of the neighbour in `direction`, if inside the grid
    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        if index >= self.cells.len() {
            return None;
        }
        let [x, y] = self.position(index);
        match direction {
            Direction::Up if y + 1 < self.height => Some(index + self.width),
            Direction::Down if y > 0 => Some(index - self.width),
            Direction::Left if x > 0 => Some(index - 1),
            Direction::Right if x + 1 < self.width => Some(index + 1),
            _ => None,
        }
    }

    /// Cell at a flat index
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell at a flat index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Flat indices along one edge of the grid, in ascending x or y order
    ///
    /// `Up`/`Down` walk the top (`y = height - 1`) and bottom (`y = 0`) rows,
    /// `Left`/`Right` walk the first and last columns.
    pub fn edge_indices(&self, edge: Direction) -> Vec<usize> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        match edge {
            Direction::Up => (0..self.width)
                .map(|x| (self.height - 1) * self.width + x)
                .collect(),
            Direction::Down => (0..self.width).collect(),
            Direction::Left => (0..self.height).map(|y| y * self.width).collect(),
            Direction::Right => (0..self.height)
                .map(|y| y * self.width + self.width - 1)
                .collect(),
        }
    }
}

/// Finished map of external tile ids, indexed `[y, x]`
///
/// Cells that never resolved hold [`UNRESOLVED_TILE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    tiles: Array2<i32>,
}

impl TileMap {
    /// Map of the given size filled with one id
    pub fn filled(width: usize, height: usize, tile: i32) -> Self {
        Self {
            tiles: Array2::from_elem((height, width), tile),
        }
    }

    /// Map external ids from a row-major vector of dense indices
    pub fn from_dense(
        width: usize,
        height: usize,
        dense: &[Option<usize>],
        index_map: &TileIndexMap,
    ) -> Self {
        let mut map = Self::filled(width, height, UNRESOLVED_TILE);
        for (index, &tile) in dense.iter().enumerate() {
            if width == 0 {
                break;
            }
            map.set(index % width, index / width, index_map.to_external_or_unresolved(tile));
        }
        map
    }

    /// Wrap an existing `[y, x]` array
    pub const fn from_array(tiles: Array2<i32>) -> Self {
        Self { tiles }
    }

    /// Map width in cells
    pub fn width(&self) -> usize {
        self.tiles.dim().1
    }

    /// Map height in cells
    pub fn height(&self) -> usize {
        self.tiles.dim().0
    }

    /// Tile id at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        self.tiles.get([y, x]).copied()
    }

    /// Overwrite the tile id at `(x, y)`; out-of-range writes are ignored
    pub fn set(&mut self, x: usize, y: usize, tile: i32) {
        if let Some(slot) = self.tiles.get_mut([y, x]) {
            *slot = tile;
        }
    }

    /// Underlying `[y, x]` array
    pub const fn as_array(&self) -> &Array2<i32> {
        &self.tiles
    }

    /// Positions of unresolved cells as `[x, y]`
    pub fn unresolved_positions(&self) -> Vec<[usize; 2]> {
        self.tiles
            .indexed_iter()
            .filter(|(_, tile)| **tile == UNRESOLVED_TILE)
            .map(|((y, x), _)| [x, y])
            .collect()
    }

    /// Rows as vectors, bottom row (`y = 0`) first
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.tiles.rows().into_iter().map(|row| row.to_vec()).collect()
    }
}
