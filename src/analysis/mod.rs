//! Rule inference from samples and statistics of generated maps

/// Adjacency rule learning from sample maps and images
pub mod patterns;
/// Tile counts and adjacency validation of generated maps
pub mod statistics;
