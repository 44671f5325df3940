/// Fixed-capacity bitset holding a cell's candidate tiles
pub mod bitset;
/// Chunked generation with checkerboard block scheduling
pub mod blocks;
/// Cell entropy and the minimum-entropy priority queue
pub mod entropy;
/// Solver engine driving collapse and propagation
pub mod executor;
/// Constraint propagation worklist and fixpoint
pub mod propagation;
/// Seeded weighted tile choice and direction ordering
pub mod selection;
