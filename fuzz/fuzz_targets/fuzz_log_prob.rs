//! Fuzz target for multinomial construction and evaluation.
//!
//! Arbitrary shapes and values (including NaN and infinities) must surface
//! as errors or non-finite results, never as panics.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mn_core::{Multinomial, NdArray};

/// Keeps arrays small so each run stays fast.
const MAX_DIM: usize = 5;

#[derive(Debug, Arbitrary)]
struct Input {
    n_shape: Vec<u8>,
    n_values: Vec<f64>,
    param_shape: Vec<u8>,
    param_values: Vec<f64>,
    counts_shape: Vec<u8>,
    counts_values: Vec<f64>,
    use_logits: bool,
    validate_args: bool,
    allow_nan_stats: bool,
}

fn array(shape: &[u8], values: &[f64]) -> Option<NdArray> {
    let shape: Vec<usize> = shape
        .iter()
        .take(3)
        .map(|&d| usize::from(d) % (MAX_DIM + 1))
        .collect();
    let len: usize = shape.iter().product();
    if values.len() < len {
        return None;
    }
    NdArray::new(shape, values[..len].to_vec()).ok()
}

fuzz_target!(|input: Input| {
    let (Some(n), Some(param), Some(counts)) = (
        array(&input.n_shape, &input.n_values),
        array(&input.param_shape, &input.param_values),
        array(&input.counts_shape, &input.counts_values),
    ) else {
        return;
    };

    let builder = Multinomial::builder(n)
        .validate_args(input.validate_args)
        .allow_nan_stats(input.allow_nan_stats);
    let builder = if input.use_logits {
        builder.logits(param)
    } else {
        builder.probs(param)
    };

    let Ok(m) = builder.build() else {
        return;
    };

    let _ = m.log_prob(&counts);
    let _ = m.prob(&counts);
    let _ = m.mean();
    let _ = m.variance();
    let _ = m.stddev();
    let _ = m.parameters();
});
