use std::fmt;

/// Number of tile indices a single domain can hold
pub const BITSET_CAPACITY: usize = 128;

/// Fixed-capacity bitset over tile indices
///
/// Bit `i` is set when tile index `i` is still a candidate. Uses 0-based
/// indexing; indices at or above [`BITSET_CAPACITY`] are ignored on insert
/// and never reported as members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileBitset {
    bits: u128,
}

impl TileBitset {
    /// Create a bitset with no tiles present
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Create a bitset with the lowest `tile_count` bits set
    pub const fn full(tile_count: usize) -> Self {
        let bits = if tile_count >= BITSET_CAPACITY {
            u128::MAX
        } else {
            (1u128 << tile_count) - 1
        };
        Self { bits }
    }

    /// Create a bitset holding exactly one tile, or an empty one if out of range
    pub const fn single(tile: usize) -> Self {
        if tile < BITSET_CAPACITY {
            Self { bits: 1u128 << tile }
        } else {
            Self::new()
        }
    }

    /// Raw bit representation
    pub const fn bits(&self) -> u128 {
        self.bits
    }

    /// Insert a tile index
    pub const fn insert(&mut self, tile: usize) {
        if tile < BITSET_CAPACITY {
            self.bits |= 1u128 << tile;
        }
    }

    /// Remove a tile index
    pub const fn remove(&mut self, tile: usize) {
        if tile < BITSET_CAPACITY {
            self.bits &= !(1u128 << tile);
        }
    }

    /// Test tile membership
    pub const fn contains(&self, tile: usize) -> bool {
        tile < BITSET_CAPACITY && (self.bits >> tile) & 1 == 1
    }

    /// Intersect this bitset with another in-place
    pub const fn intersect_with(&mut self, other: &Self) {
        self.bits &= other.bits;
    }

    /// Create a new bitset containing the intersection
    #[must_use]
    pub const fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Add every tile of another bitset in-place
    pub const fn union_with(&mut self, other: &Self) {
        self.bits |= other.bits;
    }

    /// Test if no tiles are present
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Count tiles in the set
    pub const fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Lowest tile index present
    pub const fn first(&self) -> Option<usize> {
        if self.bits == 0 {
            None
        } else {
            Some(self.bits.trailing_zeros() as usize)
        }
    }

    /// Iterate tile indices in ascending order
    pub const fn iter(&self) -> TileBitsetIter {
        TileBitsetIter { remaining: self.bits }
    }

    /// Extract all tile indices as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl FromIterator<usize> for TileBitset {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bitset = Self::new();
        for tile in iter {
            bitset.insert(tile);
        }
        bitset
    }
}

impl IntoIterator for TileBitset {
    type Item = usize;
    type IntoIter = TileBitsetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over set bits, clearing the lowest bit each step
#[derive(Clone, Debug)]
pub struct TileBitsetIter {
    remaining: u128,
}

impl Iterator for TileBitsetIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let tile = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(tile)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.remaining.count_ones() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for TileBitsetIter {}

impl fmt::Display for TileBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileBitset({} tiles: {:?})", self.count(), self.to_vec())
    }
}
