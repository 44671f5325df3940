//! Seeded random choices shared by collapse and propagation
//!
//! All randomness of one solve flows through a single [`RandomSelector`], in
//! this order: every collapse draws one `f64` for the weighted tile choice,
//! then every cell popped during the following propagation draws one index
//! into [`DIRECTION_PERMUTATIONS`]. Identical seeds therefore replay
//! identical solves.

use crate::algorithm::bitset::TileBitset;
use crate::algorithm::propagation::DIRECTION_PERMUTATIONS;
use crate::math::probability::cumulative_choice;
use crate::spatial::tiles::{Direction, ModuleTable};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seeded random selector for reproducible stochastic choices
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw one of the 24 direction orderings
    pub fn direction_order(&mut self) -> &'static [Direction; 4] {
        let index = self.rng.random_range(0..DIRECTION_PERMUTATIONS.len());
        DIRECTION_PERMUTATIONS
            .get(index)
            .unwrap_or(&Direction::ALL)
    }

    /// Weighted roulette choice among the tiles of `domain`
    ///
    /// Candidates are enumerated lowest index first and the first whose
    /// cumulative weight exceeds the scaled draw wins. Returns `None` for an
    /// empty domain or one whose weights sum to zero.
    pub fn choose_tile(&mut self, domain: TileBitset, table: &ModuleTable) -> Option<usize> {
        let draw = self.rng.random::<f64>();
        let candidates = domain.to_vec();
        let weights: Vec<f64> = candidates.iter().map(|&tile| table.weight(tile)).collect();
        cumulative_choice(&weights, draw).and_then(|position| candidates.get(position).copied())
    }
}
