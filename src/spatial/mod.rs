//! Spatial data structures and tile rules
//!
//! This module contains spatial-related functionality including:
//! - Directions and directional adjacency rules
//! - The weighted module table built from a rule set
//! - The solver cell grid and the external output map

/// Cell domains, the solver grid and output maps
pub mod grid;
/// Directions, rule sets and the weighted module table
pub mod tiles;

pub use grid::{Cell, CellGrid, TileMap};
pub use tiles::{Direction, ModuleTable, RuleSet, TileRule};
