//! Minimal dense array support for batched distribution math.

pub mod array;
pub mod shape;

pub use array::NdArray;
pub use shape::{broadcast_all, broadcast_shapes, BroadcastIndexer};
