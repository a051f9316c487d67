//! Common interface for batched probability distributions.

use mn_common::Result;

use crate::tensor::NdArray;

/// A batch of distributions sharing one event shape.
///
/// Queries take and return arrays whose leading axes are batch axes and whose
/// trailing axes are the event shape.
pub trait Distribution {
    /// Display name.
    fn name(&self) -> &str;

    /// Shape of the batch of independent distributions.
    fn batch_shape(&self) -> &[usize];

    /// Shape of a single draw.
    fn event_shape(&self) -> &[usize];

    /// Log probability (mass or density) of `value`.
    fn log_prob(&self, value: &NdArray) -> Result<NdArray>;

    /// Probability of `value`, evaluated through [`Distribution::log_prob`].
    fn prob(&self, value: &NdArray) -> Result<NdArray> {
        Ok(self.log_prob(value)?.map(f64::exp))
    }

    fn mean(&self) -> Result<NdArray>;

    fn variance(&self) -> Result<NdArray>;

    fn is_continuous(&self) -> bool;

    /// `sample_shape + batch_shape + event_shape`.
    fn extended_shape(&self, sample_shape: &[usize]) -> Vec<usize> {
        [sample_shape, self.batch_shape(), self.event_shape()].concat()
    }
}
