//! Mathematical utilities for the algorithm

/// Shannon entropy and weighted roulette selection
pub mod probability;
