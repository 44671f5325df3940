//! Tile rule sets, directional adjacency and the weighted module table
//!
//! A [`RuleSet`] is the external description of a tile set: arbitrary integer
//! tile ids, a weight per tile and, per direction, the ids allowed as that
//! neighbour. [`ModuleTable::build`] validates it and compiles it into dense
//! tile indices with one [`TileBitset`] per tile and direction, which is the
//! only form the solver reads.

use crate::algorithm::bitset::TileBitset;
use crate::io::configuration::MAX_TILE_COUNT;
use crate::io::error::{AlgorithmError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Sentinel written to output maps for cells that never resolved
pub const UNRESOLVED_TILE: i32 = -1;

/// Cardinal direction between two grid cells
///
/// `Up` increases y (row-major index `+ width`), `Right` increases x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards `y + 1`
    Up,
    /// Towards `y - 1`
    Down,
    /// Towards `x - 1`
    Left,
    /// Towards `x + 1`
    Right,
}

impl Direction {
    /// All directions in declaration order
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The direction pointing back
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Offset as `[dx, dy]`
    pub const fn offset(self) -> [i32; 2] {
        match self {
            Self::Up => [0, 1],
            Self::Down => [0, -1],
            Self::Left => [-1, 0],
            Self::Right => [1, 0],
        }
    }

    /// Position in [`Direction::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// External ids allowed next to a tile, per direction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborSets {
    /// Ids allowed in the cell above
    #[serde(default)]
    pub up: Vec<i32>,
    /// Ids allowed in the cell below
    #[serde(default)]
    pub down: Vec<i32>,
    /// Ids allowed in the cell to the left
    #[serde(default)]
    pub left: Vec<i32>,
    /// Ids allowed in the cell to the right
    #[serde(default)]
    pub right: Vec<i32>,
}

impl NeighborSets {
    /// Ids allowed in the given direction
    pub fn get(&self, direction: Direction) -> &[i32] {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// Mutable access to the ids allowed in the given direction
    pub const fn get_mut(&mut self, direction: Direction) -> &mut Vec<i32> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Allow `neighbor` in `direction`, ignoring duplicates
    pub fn allow(&mut self, direction: Direction, neighbor: i32) {
        let ids = self.get_mut(direction);
        if !ids.contains(&neighbor) {
            ids.push(neighbor);
        }
    }
}

/// One tile of an external rule set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileRule {
    /// External tile id
    pub id: i32,
    /// Relative generation weight
    pub weight: f64,
    /// Allowed neighbours per direction
    #[serde(default)]
    pub neighbors: NeighborSets,
}

impl TileRule {
    /// Create a rule with no allowed neighbours
    pub fn new(id: i32, weight: f64) -> Self {
        Self {
            id,
            weight,
            neighbors: NeighborSets::default(),
        }
    }

    /// Builder-style variant of [`NeighborSets::allow`]
    #[must_use]
    pub fn allow(mut self, direction: Direction, neighbors: &[i32]) -> Self {
        for &neighbor in neighbors {
            self.neighbors.allow(direction, neighbor);
        }
        self
    }
}

/// External tile set consumed by [`ModuleTable::build`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Tiles in enumeration order; this order fixes the dense tile indices
    pub tiles: Vec<TileRule>,
}

impl RuleSet {
    /// Wrap a list of tile rules
    pub const fn new(tiles: Vec<TileRule>) -> Self {
        Self { tiles }
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Test if the set has no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Look up a tile by external id
    pub fn get(&self, id: i32) -> Option<&TileRule> {
        self.tiles.iter().find(|tile| tile.id == id)
    }
}

/// Bijection between external tile ids and dense tile indices
#[derive(Clone, Debug, Default)]
pub struct TileIndexMap {
    to_index: HashMap<i32, usize>,
    to_external: Vec<i32>,
}

impl TileIndexMap {
    /// Dense index of an external id
    pub fn to_index(&self, external: i32) -> Option<usize> {
        self.to_index.get(&external).copied()
    }

    /// External id of a dense index
    pub fn to_external(&self, index: usize) -> Option<i32> {
        self.to_external.get(index).copied()
    }

    /// External id of an optional dense index, using the unresolved sentinel
    pub fn to_external_or_unresolved(&self, index: Option<usize>) -> i32 {
        index
            .and_then(|i| self.to_external(i))
            .unwrap_or(UNRESOLVED_TILE)
    }

    /// External ids in dense index order
    pub fn external_ids(&self) -> &[i32] {
        &self.to_external
    }

    /// Number of mapped tiles
    pub fn len(&self) -> usize {
        self.to_external.len()
    }

    /// Test if nothing is mapped
    pub fn is_empty(&self) -> bool {
        self.to_external.is_empty()
    }

    fn insert(&mut self, external: i32) -> Option<usize> {
        if self.to_index.contains_key(&external) {
            return None;
        }
        let index = self.to_external.len();
        self.to_index.insert(external, index);
        self.to_external.push(external);
        Some(index)
    }
}

/// Immutable weighted adjacency table over dense tile indices
///
/// Built once per rule set and shared by reference between any number of
/// concurrently running solvers.
#[derive(Clone, Debug)]
pub struct ModuleTable {
    weights: Vec<f64>,
    allowed: Vec<[TileBitset; 4]>,
    // compatible[h][d] holds every tile t with h in allowed[t][d]
    compatible: Vec<[TileBitset; 4]>,
    index_map: TileIndexMap,
}

impl ModuleTable {
    /// Validate a rule set and compile it into dense bitset form
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rule set is empty, or holds `MAX_TILE_COUNT` tiles or more
    /// - A tile uses the reserved unresolved id or appears twice
    /// - A weight is not a finite positive number
    /// - A neighbour id does not name a tile of the set
    pub fn build(rules: &RuleSet) -> Result<Self> {
        if rules.is_empty() {
            return Err(AlgorithmError::EmptyRuleSet);
        }
        if rules.len() >= MAX_TILE_COUNT {
            return Err(AlgorithmError::TooManyTiles {
                count: rules.len(),
                max: MAX_TILE_COUNT,
            });
        }

        let mut index_map = TileIndexMap::default();
        let mut weights = Vec::with_capacity(rules.len());
        for tile in &rules.tiles {
            if tile.id == UNRESOLVED_TILE {
                return Err(crate::io::error::invalid_parameter(
                    "tile id",
                    &tile.id,
                    &"reserved for unresolved cells",
                ));
            }
            if !tile.weight.is_finite() || tile.weight <= 0.0 {
                return Err(AlgorithmError::InvalidWeight {
                    tile: tile.id,
                    weight: tile.weight,
                });
            }
            if index_map.insert(tile.id).is_none() {
                return Err(AlgorithmError::DuplicateTile { tile: tile.id });
            }
            weights.push(tile.weight);
        }

        let mut allowed = Vec::with_capacity(rules.len());
        for tile in &rules.tiles {
            let mut masks = [TileBitset::new(); 4];
            for direction in Direction::ALL {
                let Some(mask) = masks.get_mut(direction.index()) else {
                    continue;
                };
                for &neighbor in tile.neighbors.get(direction) {
                    let index = index_map.to_index(neighbor).ok_or(
                        AlgorithmError::UnknownNeighbor {
                            tile: tile.id,
                            neighbor,
                            direction,
                        },
                    )?;
                    mask.insert(index);
                }
            }
            allowed.push(masks);
        }

        let mut compatible = vec![[TileBitset::new(); 4]; rules.len()];
        for (tile, masks) in allowed.iter().enumerate() {
            for direction in Direction::ALL {
                let Some(mask) = masks.get(direction.index()) else {
                    continue;
                };
                for neighbor in *mask {
                    if let Some(inverse) = compatible
                        .get_mut(neighbor)
                        .and_then(|inverse| inverse.get_mut(direction.index()))
                    {
                        inverse.insert(tile);
                    }
                }
            }
        }

        Ok(Self {
            weights,
            allowed,
            compatible,
            index_map,
        })
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a built table; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Generation weight of a tile, 0 for unknown indices
    pub fn weight(&self, tile: usize) -> f64 {
        self.weights.get(tile).copied().unwrap_or(0.0)
    }

    /// All weights in dense index order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Tiles permitted in the cell `direction` of `tile`
    pub fn allowed_mask(&self, tile: usize, direction: Direction) -> TileBitset {
        self.allowed
            .get(tile)
            .and_then(|masks| masks.get(direction.index()))
            .copied()
            .unwrap_or_default()
    }

    /// Tiles that permit `tile` in their cell `direction`
    pub fn compatible_mask(&self, tile: usize, direction: Direction) -> TileBitset {
        self.compatible
            .get(tile)
            .and_then(|masks| masks.get(direction.index()))
            .copied()
            .unwrap_or_default()
    }

    /// Tiles that may sit next to a fixed `tile` lying `edge` of them
    ///
    /// Both rules of the pair must agree: `tile` permits the candidate on
    /// its `edge.opposite()` side and the candidate permits `tile` on its
    /// `edge` side.
    pub fn border_mask(&self, tile: usize, edge: Direction) -> TileBitset {
        self.allowed_mask(tile, edge.opposite())
            .intersection(&self.compatible_mask(tile, edge))
    }

    /// Union of [`allowed_mask`](Self::allowed_mask) over every tile in `domain`
    pub fn propagation_mask(&self, domain: TileBitset, direction: Direction) -> TileBitset {
        let mut mask = TileBitset::new();
        for tile in domain {
            mask.union_with(&self.allowed_mask(tile, direction));
        }
        mask
    }

    /// Test whether `neighbor` may sit `direction` of `tile`
    pub fn allows(&self, tile: usize, direction: Direction, neighbor: usize) -> bool {
        self.allowed_mask(tile, direction).contains(neighbor)
    }

    /// External id ↔ dense index mapping
    pub const fn index_map(&self) -> &TileIndexMap {
        &self.index_map
    }
}
