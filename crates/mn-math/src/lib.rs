//! Multinomial math utilities.

pub mod math;

pub use math::combinations::*;
pub use math::softmax::*;
pub use math::stable::*;
