//! Small, self-contained data structures used across the project.

pub mod bitset;

pub use bitset::{words_for_bits, DynamicBitSet, DynamicBitSetIterator};
