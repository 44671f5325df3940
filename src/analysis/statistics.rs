//! Output statistics and adjacency validation of generated maps

use crate::spatial::grid::TileMap;
use crate::spatial::tiles::{Direction, ModuleTable, UNRESOLVED_TILE};
use std::collections::BTreeMap;
use std::fmt;

/// Neighbouring pair of resolved cells that the rule set forbids
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdjacencyViolation {
    /// `[x, y]` of the cell whose rule is broken
    pub position: [usize; 2],
    /// Direction from that cell to the offending neighbour
    pub direction: Direction,
    /// External id at `position`
    pub tile: i32,
    /// External id of the neighbour
    pub neighbor: i32,
}

/// Check every resolved cell against each resolved neighbour
///
/// Unresolved cells and ids unknown to `table` are skipped.
pub fn validate_adjacency(map: &TileMap, table: &ModuleTable) -> Vec<AdjacencyViolation> {
    let index_map = table.index_map();
    let mut violations = Vec::new();

    for ((y, x), &tile) in map.as_array().indexed_iter() {
        let Some(tile_index) = index_map.to_index(tile) else {
            continue;
        };
        for direction in Direction::ALL {
            let [dx, dy] = direction.offset();
            let (Some(nx), Some(ny)) = (
                x.checked_add_signed(dx as isize),
                y.checked_add_signed(dy as isize),
            ) else {
                continue;
            };
            let Some(neighbor) = map.get(nx, ny) else {
                continue;
            };
            if neighbor == UNRESOLVED_TILE {
                continue;
            }
            let Some(neighbor_index) = index_map.to_index(neighbor) else {
                continue;
            };
            if !table.allows(tile_index, direction, neighbor_index) {
                violations.push(AdjacencyViolation {
                    position: [x, y],
                    direction,
                    tile,
                    neighbor,
                });
            }
        }
    }

    violations
}

/// Summary of a generated map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapStatistics {
    /// Map width in cells
    pub width: usize,
    /// Map height in cells
    pub height: usize,
    /// Occurrences of each resolved id
    pub tile_counts: BTreeMap<i32, usize>,
    /// Number of unresolved cells
    pub unresolved: usize,
    /// Forbidden adjacencies between resolved cells
    pub violations: Vec<AdjacencyViolation>,
}

impl MapStatistics {
    /// Count tiles and validate adjacency
    pub fn compute(map: &TileMap, table: &ModuleTable) -> Self {
        let mut tile_counts = BTreeMap::new();
        let mut unresolved = 0;
        for &tile in map.as_array() {
            if tile == UNRESOLVED_TILE {
                unresolved += 1;
            } else {
                *tile_counts.entry(tile).or_insert(0) += 1;
            }
        }

        Self {
            width: map.width(),
            height: map.height(),
            tile_counts,
            unresolved,
            violations: validate_adjacency(map, table),
        }
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Share of cells that resolved, in `[0, 1]`
    pub fn resolved_ratio(&self) -> f64 {
        if self.cell_count() == 0 {
            return 0.0;
        }
        (self.cell_count() - self.unresolved) as f64 / self.cell_count() as f64
    }

    /// No resolved pair breaks a rule
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for MapStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} map, {:.1}% resolved, {} distinct tiles, {} adjacency violations",
            self.width,
            self.height,
            self.resolved_ratio() * 100.0,
            self.tile_counts.len(),
            self.violations.len()
        )
    }
}
