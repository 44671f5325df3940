//! The collapse-and-propagate solver engine
//!
//! A [`WaveSolver`] owns one grid, its entropy queue and its propagation
//! worklist, and reads the shared [`ModuleTable`] by reference. Construction
//! fills every cell with the full domain, applies optional border vectors and
//! propagates them. Each cycle then collapses the minimum-entropy cell by a
//! weighted draw and propagates the result to a fixpoint, until the queue
//! empties. Contradictions are recorded as diagnostics and never abort a run.

use crate::algorithm::entropy::{EntropyQueue, cell_entropy};
use crate::algorithm::propagation::{PropagationWorklist, propagate};
use crate::algorithm::selection::RandomSelector;
use crate::io::configuration::{DEFAULT_HEIGHT, DEFAULT_SEED, DEFAULT_WIDTH, MAX_GRID_DIMENSION};
use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use crate::spatial::grid::{CellGrid, TileMap};
use crate::spatial::tiles::{Direction, ModuleTable, UNRESOLVED_TILE};
use bitvec::prelude::*;
use std::fmt;

/// Dimensions and seed of one solve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Seed of the random stream driving collapse and direction order
    pub seed: u64,
}

impl SolverConfig {
    /// Create a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or exceeds `MAX_GRID_DIMENSION`.
    pub fn new(width: usize, height: usize, seed: u64) -> Result<Self> {
        let config = Self {
            width,
            height,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check both dimensions
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or exceeds `MAX_GRID_DIMENSION`.
    pub fn validate(&self) -> Result<()> {
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)
    }

    /// Number of cells of the configured grid
    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: DEFAULT_SEED,
        }
    }
}

pub(crate) fn validate_dimension(parameter: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(invalid_parameter(parameter, &value, &"must be at least 1"));
    }
    if value > MAX_GRID_DIMENSION {
        return Err(invalid_parameter(
            parameter,
            &value,
            &format!("must not exceed {MAX_GRID_DIMENSION}"),
        ));
    }
    Ok(())
}

/// Tiles assumed to lie just outside each edge of the grid
///
/// `Up` and `Down` vectors are indexed by x, `Left` and `Right` by y. A slot
/// holding `None` places no constraint on its boundary cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Borders {
    edges: [Option<Vec<Option<usize>>>; 4],
}

impl Borders {
    /// No edge constrained
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the border vector of one edge, in dense tile indices
    #[must_use]
    pub fn with_edge(mut self, edge: Direction, slots: Vec<Option<usize>>) -> Self {
        if let Some(entry) = self.edges.get_mut(edge.index()) {
            *entry = Some(slots);
        }
        self
    }

    /// Set the border vector of one edge from external tile ids
    ///
    /// `UNRESOLVED_TILE` marks an unconstrained slot.
    ///
    /// # Errors
    ///
    /// Returns an error if an id does not name a tile of `table`.
    pub fn with_external_edge(
        self,
        edge: Direction,
        ids: &[i32],
        table: &ModuleTable,
    ) -> Result<Self> {
        let slots = ids
            .iter()
            .map(|&id| {
                if id == UNRESOLVED_TILE {
                    return Ok(None);
                }
                table
                    .index_map()
                    .to_index(id)
                    .map(Some)
                    .ok_or_else(|| {
                        invalid_parameter("border tile", &id, &"not part of the rule set")
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.with_edge(edge, slots))
    }

    /// Border vector of one edge, if supplied
    pub fn edge(&self, edge: Direction) -> Option<&[Option<usize>]> {
        self.edges.get(edge.index())?.as_deref()
    }

    /// Test if no edge is constrained
    pub fn is_empty(&self) -> bool {
        self.edges.iter().all(Option::is_none)
    }

    fn validate(&self, width: usize, height: usize, tile_count: usize) -> Result<()> {
        for edge in Direction::ALL {
            let Some(slots) = self.edge(edge) else {
                continue;
            };
            let expected = match edge {
                Direction::Up | Direction::Down => width,
                Direction::Left | Direction::Right => height,
            };
            if slots.len() != expected {
                return Err(invalid_parameter(
                    "border length",
                    &slots.len(),
                    &format!("{edge} edge needs {expected} slots"),
                ));
            }
            if let Some(&index) = slots.iter().flatten().find(|&&index| index >= tile_count) {
                return Err(AlgorithmError::InvalidTileIndex {
                    index,
                    max_tiles: tile_count,
                });
            }
        }
        Ok(())
    }
}

/// Soft outcome of a solve, ordered by severity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolveStatus {
    /// Nothing went wrong
    #[default]
    Ok,
    /// Bookkeeping anomaly that did not affect the output
    Warning,
    /// At least one cell was constrained to an empty domain
    Error,
}

impl SolveStatus {
    /// Keep the more severe of two statuses
    #[must_use]
    pub fn max_with(self, other: Self) -> Self {
        self.max(other)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Per-cell condition recorded while solving
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A cell lost its last candidate during propagation
    ContradictionAtCell {
        /// Flat cell index
        cell: usize,
        /// `[x, y]` position
        position: [usize; 2],
    },
    /// Selection picked a cell that was already resolved or dead
    AlreadyCollapsedReentry {
        /// Flat cell index
        cell: usize,
        /// `[x, y]` position
        position: [usize; 2],
    },
}

impl Diagnostic {
    /// Status this diagnostic raises a solve to
    pub const fn severity(&self) -> SolveStatus {
        match self {
            Self::ContradictionAtCell { .. } => SolveStatus::Error,
            Self::AlreadyCollapsedReentry { .. } => SolveStatus::Warning,
        }
    }

    /// `[x, y]` position of the affected cell
    pub const fn position(&self) -> [usize; 2] {
        match self {
            Self::ContradictionAtCell { position, .. }
            | Self::AlreadyCollapsedReentry { position, .. } => *position,
        }
    }
}

/// Where the solver currently is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverPhase {
    /// Grid and queue are being set up
    Initializing,
    /// Draining the propagation worklist
    Propagating,
    /// Ready to collapse the next minimum-entropy cell
    Selecting,
    /// The entropy queue is empty
    Done,
}

/// Summary of one collapse-and-propagate cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepResult {
    /// No cell is left to collapse
    pub done: bool,
    /// Position and tile index of the cell collapsed in this cycle
    pub collapsed: Option<([usize; 2], usize)>,
    /// Distinct cells whose domain changed in this cycle
    pub changed: usize,
    /// Cells that became dead in this cycle
    pub contradictions: usize,
}

/// Receiver of per-cycle progress from a [`WaveSolver`]
///
/// Called synchronously after each cycle: once per cell whose domain changed
/// in that cycle, then once with the cycle number.
pub trait SolverObserver {
    /// A cell's domain changed during the cycle just completed
    fn cell_changed(&mut self, position: [usize; 2], domain_size: usize, selected: Option<usize>);

    /// One collapse and its propagation finished
    fn cycle_completed(&mut self, _cycle: usize) {}
}

/// Cells touched since the last flush, each listed once
#[derive(Clone, Debug)]
struct ChangeSet {
    cells: Vec<usize>,
    marked: BitVec,
}

impl ChangeSet {
    fn new(cell_count: usize) -> Self {
        Self {
            cells: Vec::new(),
            marked: bitvec![0; cell_count],
        }
    }

    fn mark(&mut self, cell: usize) {
        if self.marked.get(cell).as_deref() == Some(&false) {
            self.marked.set(cell, true);
            self.cells.push(cell);
        }
    }

    fn drain(&mut self) -> Vec<usize> {
        for &cell in &self.cells {
            self.marked.set(cell, false);
        }
        std::mem::take(&mut self.cells)
    }
}

/// Single-threaded wave function collapse solver over one grid
#[derive(Clone, Debug)]
pub struct WaveSolver<'a> {
    table: &'a ModuleTable,
    config: SolverConfig,
    grid: CellGrid,
    queue: EntropyQueue,
    worklist: PropagationWorklist,
    selector: RandomSelector,
    changes: ChangeSet,
    phase: SolverPhase,
    status: SolveStatus,
    diagnostics: Vec<Diagnostic>,
    collapses: usize,
    cycles: usize,
    mask_computations: usize,
}

impl<'a> WaveSolver<'a> {
    /// Create a solver with unconstrained edges
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the table is empty.
    pub fn new(table: &'a ModuleTable, config: SolverConfig) -> Result<Self> {
        Self::with_borders(table, config, &Borders::none())
    }

    /// Create a solver whose boundary cells are pre-constrained by `borders`
    ///
    /// Each supplied border slot acts like an already collapsed cell just
    /// outside the grid. The resulting constraints are propagated before this
    /// returns, so the first [`step_once`](Self::step_once) already sees them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid or the table is empty
    /// - A border vector has the wrong length for its edge
    /// - A border slot names a tile index outside the table
    pub fn with_borders(
        table: &'a ModuleTable,
        config: SolverConfig,
        borders: &Borders,
    ) -> Result<Self> {
        config.validate()?;
        if table.is_empty() {
            return Err(AlgorithmError::EmptyRuleSet);
        }
        borders.validate(config.width, config.height, table.len())?;

        let grid = CellGrid::new(config.width, config.height, table.len());
        let cell_count = grid.len();
        let mut queue = EntropyQueue::new(cell_count);
        for (index, cell) in grid.cells().iter().enumerate() {
            queue.update(index, cell_entropy(cell, table));
        }

        let mut solver = Self {
            table,
            config,
            grid,
            queue,
            worklist: PropagationWorklist::new(cell_count),
            selector: RandomSelector::new(config.seed),
            changes: ChangeSet::new(cell_count),
            phase: SolverPhase::Initializing,
            status: SolveStatus::Ok,
            diagnostics: Vec::new(),
            collapses: 0,
            cycles: 0,
            mask_computations: 0,
        };

        log::debug!(
            "Starting {}x{} solve over {} tiles (seed {})",
            config.width,
            config.height,
            table.len(),
            config.seed
        );

        if !borders.is_empty() {
            solver.apply_borders(borders);
            solver.phase = SolverPhase::Propagating;
            solver.propagate_pending();
            solver.changes.drain();
        }

        if solver.queue.is_empty() {
            solver.finish();
        } else {
            solver.phase = SolverPhase::Selecting;
        }
        Ok(solver)
    }

    fn apply_borders(&mut self, borders: &Borders) {
        for edge in Direction::ALL {
            let Some(slots) = borders.edge(edge) else {
                continue;
            };
            let cells = self.grid.edge_indices(edge);
            for (&cell_index, &slot) in cells.iter().zip(slots) {
                let Some(tile) = slot else {
                    continue;
                };
                let allowed = self.table.border_mask(tile, edge);
                let Some(cell) = self.grid.get_mut(cell_index) else {
                    continue;
                };
                if cell.is_dead() || !cell.constrain(allowed) {
                    continue;
                }
                let updated = *cell;
                self.queue.update(cell_index, cell_entropy(&updated, self.table));
                self.changes.mark(cell_index);
                if updated.is_dead() {
                    self.record_contradiction(cell_index);
                } else {
                    self.worklist.push(cell_index);
                }
            }
        }
    }

    /// Drain the worklist; returns the number of new contradictions
    fn propagate_pending(&mut self) -> usize {
        let table = self.table;
        let queue = &mut self.queue;
        let changes = &mut self.changes;
        let outcome = propagate(
            &mut self.grid,
            table,
            &mut self.worklist,
            &mut self.selector,
            |index, cell| {
                queue.update(index, cell_entropy(cell, table));
                changes.mark(index);
            },
        );
        self.mask_computations += outcome.mask_computations;
        for &cell in &outcome.contradictions {
            self.record_contradiction(cell);
        }
        outcome.contradictions.len()
    }

    fn record_contradiction(&mut self, cell: usize) {
        let position = self.grid.position(cell);
        log::debug!("Contradiction at cell ({}, {})", position[0], position[1]);
        self.record(Diagnostic::ContradictionAtCell { cell, position });
    }

    fn record(&mut self, diagnostic: Diagnostic) {
        self.status = self.status.max_with(diagnostic.severity());
        self.diagnostics.push(diagnostic);
    }

    fn finish(&mut self) {
        if self.phase == SolverPhase::Done {
            return;
        }
        self.phase = SolverPhase::Done;
        log::debug!(
            "Solve finished after {} collapses with status {} ({} unresolved cells)",
            self.collapses,
            self.status,
            self.unresolved_count()
        );
    }

    /// Run one collapse-and-propagate cycle
    pub fn step_once(&mut self) -> StepResult {
        self.cycle(None)
    }

    /// Run one cycle and report its changes to `observer`
    pub fn step_observed(&mut self, observer: &mut dyn SolverObserver) -> StepResult {
        self.cycle(Some(observer))
    }

    /// Run cycles until no cell is left to collapse
    pub fn run(&mut self) -> SolveStatus {
        while !self.cycle(None).done {}
        self.status
    }

    /// Run to completion, reporting every cycle to `observer`
    pub fn run_observed(&mut self, observer: &mut dyn SolverObserver) -> SolveStatus {
        while !self.cycle(Some(&mut *observer)).done {}
        self.status
    }

    fn cycle(&mut self, observer: Option<&mut dyn SolverObserver>) -> StepResult {
        if self.phase == SolverPhase::Done {
            return StepResult {
                done: true,
                ..StepResult::default()
            };
        }

        let Some(cell_index) = self.queue.peek_min() else {
            self.finish();
            return StepResult {
                done: true,
                ..StepResult::default()
            };
        };
        let entropy = self.queue.entropy_of(cell_index).unwrap_or_default();
        self.queue.remove_cell(cell_index);

        let mut result = StepResult::default();
        let cell = self.grid.get(cell_index).copied();
        let choice = match cell {
            Some(cell) if cell.domain_count() > 1 => {
                self.selector.choose_tile(cell.domain(), self.table)
            }
            _ => None,
        };

        if let Some(tile) = choice {
            if let Some(target) = self.grid.get_mut(cell_index) {
                target.collapse_to(tile);
            }
            self.collapses += 1;
            let position = self.grid.position(cell_index);
            log::trace!(
                "Collapsed cell ({}, {}) at entropy {entropy:.3} to tile {tile}",
                position[0],
                position[1]
            );
            self.changes.mark(cell_index);
            self.worklist.push(cell_index);
            result.collapsed = Some((position, tile));

            self.phase = SolverPhase::Propagating;
            result.contradictions = self.propagate_pending();
        } else {
            let position = self.grid.position(cell_index);
            log::warn!(
                "Selected cell ({}, {}) has no remaining choice",
                position[0],
                position[1]
            );
            self.record(Diagnostic::AlreadyCollapsedReentry {
                cell: cell_index,
                position,
            });
        }

        self.cycles += 1;
        let changed = self.changes.drain();
        result.changed = changed.len();
        if let Some(observer) = observer {
            for index in changed {
                if let Some(cell) = self.grid.get(index) {
                    observer.cell_changed(
                        self.grid.position(index),
                        cell.domain_count(),
                        cell.selected(),
                    );
                }
            }
            observer.cycle_completed(self.cycles);
        }

        if self.queue.is_empty() {
            self.finish();
            result.done = true;
        } else {
            self.phase = SolverPhase::Selecting;
        }
        result
    }

    /// Resolved tile index per cell in row-major order, `None` if unresolved
    pub fn dense_output(&self) -> Vec<Option<usize>> {
        self.grid.cells().iter().map(|cell| cell.selected()).collect()
    }

    /// Current grid as external tile ids
    pub fn tile_map(&self) -> TileMap {
        TileMap::from_dense(
            self.config.width,
            self.config.height,
            &self.dense_output(),
            self.table.index_map(),
        )
    }

    /// Number of cells without a single remaining candidate
    pub fn unresolved_count(&self) -> usize {
        self.grid.cells().iter().filter(|cell| !cell.is_resolved()).count()
    }

    /// Consume the solver into its final result
    pub fn into_generation(self) -> Generation {
        let map = self.tile_map();
        let unresolved = map.unresolved_positions();
        Generation {
            map,
            status: self.status,
            diagnostics: self.diagnostics,
            unresolved,
            collapses: self.collapses,
            mask_computations: self.mask_computations,
        }
    }

    /// Lifecycle phase
    pub const fn phase(&self) -> SolverPhase {
        self.phase
    }

    /// Most severe condition recorded so far
    pub const fn status(&self) -> SolveStatus {
        self.status
    }

    /// Recorded conditions in discovery order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of weighted collapses performed
    pub const fn collapses(&self) -> usize {
        self.collapses
    }

    /// Number of completed cycles
    pub const fn cycles(&self) -> usize {
        self.cycles
    }

    /// Number of propagation mask computations, one per live popped cell
    pub const fn mask_computations(&self) -> usize {
        self.mask_computations
    }

    /// Solver configuration
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Cell grid
    pub const fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Entropy queue
    pub const fn queue(&self) -> &EntropyQueue {
        &self.queue
    }
}

/// Finished map of one solve with its soft status
#[derive(Clone, Debug)]
pub struct Generation {
    /// External tile ids, unresolved cells as `UNRESOLVED_TILE`
    pub map: TileMap,
    /// Most severe recorded condition
    pub status: SolveStatus,
    /// Every recorded condition
    pub diagnostics: Vec<Diagnostic>,
    /// `[x, y]` positions of unresolved cells
    pub unresolved: Vec<[usize; 2]>,
    /// Number of weighted collapses performed
    pub collapses: usize,
    /// Number of propagation mask computations, one per live popped cell
    pub mask_computations: usize,
}

impl Generation {
    /// Every cell resolved and nothing was recorded
    pub fn is_complete(&self) -> bool {
        self.status == SolveStatus::Ok && self.unresolved.is_empty()
    }
}

/// Solve a grid in one call
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the table is empty.
pub fn solve(table: &ModuleTable, config: SolverConfig) -> Result<Generation> {
    solve_with_borders(table, config, &Borders::none())
}

/// Solve a grid whose edges are stitched to the given borders
///
/// # Errors
///
/// Returns an error if the configuration or a border vector is invalid.
pub fn solve_with_borders(
    table: &ModuleTable,
    config: SolverConfig,
    borders: &Borders,
) -> Result<Generation> {
    let mut solver = WaveSolver::with_borders(table, config, borders)?;
    solver.run();
    Ok(solver.into_generation())
}
