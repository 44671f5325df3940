//! Cell entropy and the indexed minimum-entropy priority queue
//!
//! The queue is a binary min-heap of `(cell, entropy)` entries plus a reverse
//! map from cell index to heap slot, so a stale entry can be removed or
//! replaced in O(log n) whenever a cell's domain shrinks. Entries order by
//! entropy and then by cell index, which makes the minimum deterministic when
//! several cells share the lowest entropy.

use crate::math::probability::shannon_entropy;
use crate::spatial::grid::Cell;
use crate::spatial::tiles::ModuleTable;
use std::cmp::Ordering;

/// Entropy of a cell's weighted domain
///
/// Exactly 0 for resolved and dead cells, so both are ignored by selection.
pub fn cell_entropy(cell: &Cell, table: &ModuleTable) -> f64 {
    if cell.domain_count() <= 1 {
        return 0.0;
    }
    shannon_entropy(cell.domain().iter().map(|tile| table.weight(tile)))
}

/// Handle to a live queue entry
///
/// There is at most one entry per cell, so the handle is the cell index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntropyHandle(usize);

impl EntropyHandle {
    /// Cell this handle refers to
    pub const fn cell(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    cell: usize,
    entropy: f64,
}

impl QueueEntry {
    fn cmp_priority(&self, other: &Self) -> Ordering {
        self.entropy
            .total_cmp(&other.entropy)
            .then(self.cell.cmp(&other.cell))
    }
}

/// Indexed binary min-heap keyed by cell entropy
#[derive(Clone, Debug, Default)]
pub struct EntropyQueue {
    heap: Vec<QueueEntry>,
    slots: Vec<Option<usize>>,
}

impl EntropyQueue {
    /// Create a queue able to address `cell_count` cells
    pub fn new(cell_count: usize) -> Self {
        Self {
            heap: Vec::with_capacity(cell_count),
            slots: vec![None; cell_count],
        }
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Test if no entries remain
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Test if a cell has a live entry
    pub fn contains(&self, cell: usize) -> bool {
        self.slots.get(cell).copied().flatten().is_some()
    }

    /// Current entropy stored for a cell
    pub fn entropy_of(&self, cell: usize) -> Option<f64> {
        let slot = self.slots.get(cell).copied().flatten()?;
        self.heap.get(slot).map(|entry| entry.entropy)
    }

    /// Insert or replace the entry for `cell`
    pub fn insert(&mut self, cell: usize, entropy: f64) -> EntropyHandle {
        if cell >= self.slots.len() {
            self.slots.resize(cell + 1, None);
        }
        if let Some(slot) = self.slots.get(cell).copied().flatten() {
            if let Some(entry) = self.heap.get_mut(slot) {
                entry.entropy = entropy;
            }
            self.restore(slot);
            return EntropyHandle(cell);
        }

        let slot = self.heap.len();
        self.heap.push(QueueEntry { cell, entropy });
        self.set_slot(cell, Some(slot));
        self.sift_up(slot);
        EntropyHandle(cell)
    }

    /// Remove the entry behind a handle
    ///
    /// Returns false if the entry was already gone.
    pub fn remove(&mut self, handle: EntropyHandle) -> bool {
        self.remove_cell(handle.cell())
    }

    /// Remove the entry for a cell, if present
    pub fn remove_cell(&mut self, cell: usize) -> bool {
        let Some(slot) = self.slots.get(cell).copied().flatten() else {
            return false;
        };
        let last = self.heap.len() - 1;
        self.swap_entries(slot, last);
        self.heap.pop();
        self.set_slot(cell, None);
        if slot < self.heap.len() {
            self.restore(slot);
        }
        true
    }

    /// Cell with the lowest entropy, if any remain
    pub fn peek_min(&self) -> Option<usize> {
        self.heap.first().map(|entry| entry.cell)
    }

    /// Refresh a cell after its domain changed
    ///
    /// Drops the stale entry and re-inserts only while entropy stays positive.
    pub fn update(&mut self, cell: usize, entropy: f64) {
        if entropy > 0.0 {
            self.insert(cell, entropy);
        } else {
            self.remove_cell(cell);
        }
    }

    fn set_slot(&mut self, cell: usize, slot: Option<usize>) {
        if let Some(entry) = self.slots.get_mut(cell) {
            *entry = slot;
        }
    }

    fn swap_entries(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        if let Some(cell) = self.heap.get(a).map(|entry| entry.cell) {
            self.set_slot(cell, Some(a));
        }
        if let Some(cell) = self.heap.get(b).map(|entry| entry.cell) {
            self.set_slot(cell, Some(b));
        }
    }

    fn less(&self, a: usize, b: usize) -> bool {
        match (self.heap.get(a), self.heap.get(b)) {
            (Some(left), Some(right)) => left.cmp_priority(right) == Ordering::Less,
            _ => false,
        }
    }

    fn restore(&mut self, slot: usize) {
        if slot > 0 && self.less(slot, (slot - 1) / 2) {
            self.sift_up(slot);
        } else {
            self.sift_down(slot);
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap_entries(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap_entries(slot, smallest);
            slot = smallest;
        }
    }
}
