//! Constraint propagation to a fixpoint over the cell grid
//!
//! Every cell whose domain shrank is pushed onto a worklist. Popping a cell
//! re-derives, for each neighbour, the union of tiles its remaining domain
//! allows in that direction and intersects the neighbour's domain with it.
//! Domains only shrink, so the worklist always drains.

use crate::algorithm::selection::RandomSelector;
use crate::io::configuration::DIRECTION_PERMUTATION_COUNT;
use crate::spatial::grid::{Cell, CellGrid};
use crate::spatial::tiles::{Direction, ModuleTable};
use bitvec::prelude::*;

const U: Direction = Direction::Up;
const D: Direction = Direction::Down;
const L: Direction = Direction::Left;
const R: Direction = Direction::Right;

/// Every ordering of the four directions
///
/// One ordering is drawn per propagation step so no direction systematically
/// constrains a neighbour first.
pub const DIRECTION_PERMUTATIONS: [[Direction; 4]; DIRECTION_PERMUTATION_COUNT] = [
    [U, D, L, R],
    [U, D, R, L],
    [U, L, D, R],
    [U, L, R, D],
    [U, R, D, L],
    [U, R, L, D],
    [D, U, L, R],
    [D, U, R, L],
    [D, L, U, R],
    [D, L, R, U],
    [D, R, U, L],
    [D, R, L, U],
    [L, U, D, R],
    [L, U, R, D],
    [L, D, U, R],
    [L, D, R, U],
    [L, R, U, D],
    [L, R, D, U],
    [R, U, D, L],
    [R, U, L, D],
    [R, D, U, L],
    [R, D, L, U],
    [R, L, U, D],
    [R, L, D, U],
];

/// Stack of cells waiting to push their constraints outward
///
/// A cell is held at most once; re-pushing a queued cell is a no-op since it
/// will propagate its latest domain when popped. The stack is therefore
/// bounded by the grid's cell count.
#[derive(Clone, Debug)]
pub struct PropagationWorklist {
    stack: Vec<usize>,
    queued: BitVec,
}

impl PropagationWorklist {
    /// Create a worklist for a grid of `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            stack: Vec::with_capacity(cell_count),
            queued: bitvec![0; cell_count],
        }
    }

    /// Queue a cell; returns false if it was already queued or out of range
    pub fn push(&mut self, cell: usize) -> bool {
        if cell >= self.queued.len() || self.is_queued(cell) {
            return false;
        }
        self.queued.set(cell, true);
        self.stack.push(cell);
        true
    }

    /// Take the most recently queued cell
    pub fn pop(&mut self) -> Option<usize> {
        let cell = self.stack.pop()?;
        self.queued.set(cell, false);
        Some(cell)
    }

    /// Test if a cell is currently queued
    pub fn is_queued(&self, cell: usize) -> bool {
        self.queued.get(cell).as_deref() == Some(&true)
    }

    /// Number of queued cells
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Test if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drop all queued cells
    pub fn clear(&mut self) {
        self.stack.clear();
        self.queued.fill(false);
    }
}

/// Summary of one propagation run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    /// Cells whose domain became empty, in discovery order
    pub contradictions: Vec<usize>,
    /// Number of neighbour domains that shrank
    pub constrained: usize,
    /// Number of live cells whose outgoing masks were computed
    pub mask_computations: usize,
}

/// Drain the worklist, constraining neighbours until nothing changes
///
/// `on_change` is called with the flat index and new state of every cell
/// whose domain shrank. Dead cells are reported in the outcome and never
/// propagate further. Consumes one direction-order draw per popped cell.
pub fn propagate<F>(
    grid: &mut CellGrid,
    table: &ModuleTable,
    worklist: &mut PropagationWorklist,
    selector: &mut RandomSelector,
    mut on_change: F,
) -> PropagationOutcome
where
    F: FnMut(usize, &Cell),
{
    let mut outcome = PropagationOutcome::default();

    while let Some(cell_index) = worklist.pop() {
        let Some(cell) = grid.get(cell_index).copied() else {
            continue;
        };
        if cell.is_dead() {
            continue;
        }

        let domain = cell.domain();
        let masks = Direction::ALL.map(|direction| table.propagation_mask(domain, direction));
        outcome.mask_computations += 1;

        for &direction in selector.direction_order() {
            let Some(neighbor_index) = grid.neighbor(cell_index, direction) else {
                continue;
            };
            let Some(neighbor) = grid.get_mut(neighbor_index) else {
                continue;
            };
            if neighbor.is_dead() {
                continue;
            }

            let allowed = masks.get(direction.index()).copied().unwrap_or_default();
            if !neighbor.constrain(allowed) {
                continue;
            }
            outcome.constrained += 1;
            let updated = *neighbor;
            on_change(neighbor_index, &updated);

            if updated.is_dead() {
                outcome.contradictions.push(neighbor_index);
            } else {
                worklist.push(neighbor_index);
            }
        }
    }

    outcome
}
