pub mod bitset;
pub mod blocks;
