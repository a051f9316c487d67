//! Multinomial distribution over batched count vectors.
//!
//! - [`tensor`]: dense `f64` arrays and broadcasting
//! - [`params`]: logits / probabilities conversion
//! - [`checks`]: eager parameter and sample validation
//! - [`multinomial`]: the distribution itself
//! - [`logging`]: optional `tracing` subscriber setup

pub mod checks;
pub mod distribution;
pub mod logging;
pub mod multinomial;
pub mod params;
pub mod tensor;

pub use distribution::Distribution;
pub use multinomial::{Multinomial, MultinomialBuilder, DEFAULT_NAME};
pub use params::{get_logits_and_probs, Param};
pub use tensor::NdArray;

pub use mn_common::{DistributionOptions, Error, Result, SampleConstraint};
