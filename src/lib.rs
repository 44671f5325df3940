//! Wave function collapse solver for procedural tile maps
//!
//! A rule set of weighted tiles with directional adjacency lists is compiled
//! into a [`ModuleTable`]. [`WaveSolver`] then repeatedly collapses the
//! lowest-entropy cell of a grid and propagates the consequences until every
//! cell is resolved or proven impossible. Large maps are produced by
//! [`BlockScheduler`], which solves fixed-size blocks in four parallel
//! checkerboard passes stitched together through their borders.

#![forbid(unsafe_code)]

/// Core solver: bitset domains, entropy queue, propagation and scheduling
pub mod algorithm;
/// Rule inference from samples and output statistics
pub mod analysis;
/// Input/output operations and error handling
pub mod io;
/// Entropy and weighted roulette selection
pub mod math;
/// Directions, rule sets, cells and grids
pub mod spatial;

pub use algorithm::blocks::{BlockLayout, BlockScheduler, BlockedGeneration};
pub use algorithm::executor::{
    Borders, Generation, SolveStatus, SolverConfig, SolverObserver, StepResult, WaveSolver,
};
pub use io::error::{AlgorithmError, Result};
pub use spatial::{Direction, ModuleTable, RuleSet, TileMap, TileRule};
