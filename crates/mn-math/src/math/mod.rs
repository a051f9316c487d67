//! Core math modules.

pub mod combinations;
pub mod softmax;
pub mod stable;
