//! Eager argument checks.
//!
//! Every check runs to completion before the computation it guards, so a
//! failing call never returns partial numeric output. Failures are logged at
//! debug level with the first offending flat index.

use mn_common::{DistributionOptions, Error, Result, SampleConstraint};
use mn_math::is_integer_valued;
use tracing::debug;

use crate::tensor::NdArray;

/// First index whose value is below zero.
fn first_negative(values: &[f64]) -> Option<usize> {
    values.iter().position(|&x| x < 0.0)
}

/// First index whose value is not within `tol` of an integer.
fn first_non_integer(values: &[f64], tol: f64) -> Option<usize> {
    values.iter().position(|&x| !is_integer_valued(x, tol))
}

/// First index where `|value - target| > tol`. NaN counts as a mismatch.
fn first_mismatch(diffs: &[f64], tol: f64) -> Option<usize> {
    diffs.iter().position(|&d| d.is_nan() || d.abs() > tol)
}

/// Trial counts must be non-negative integers.
pub fn validate_n(n: &NdArray, options: &DistributionOptions) -> Result<()> {
    if let Some(index) = first_negative(n.data()) {
        debug!(parameter = "n", index, value = n.data()[index], "n has negative components");
        return Err(Error::invalid_parameter("n", "n has negative components"));
    }
    if let Some(index) = first_non_integer(n.data(), options.integer_tolerance) {
        debug!(parameter = "n", index, value = n.data()[index], "n has non-integer components");
        return Err(Error::invalid_parameter("n", "n has non-integer components"));
    }
    Ok(())
}

/// Probabilities must be non-negative and sum to 1 along the last axis.
pub fn validate_probs(p: &NdArray, options: &DistributionOptions) -> Result<()> {
    if let Some(index) = first_negative(p.data()) {
        debug!(parameter = "p", index, value = p.data()[index], "p has negative components");
        return Err(Error::invalid_parameter("p", "p has negative components"));
    }
    let deviation = p.reduce_last(|row| row.iter().sum::<f64>() - 1.0)?;
    if let Some(row) = first_mismatch(deviation.data(), options.p_sum_tolerance) {
        debug!(
            parameter = "p",
            row,
            deviation = deviation.data()[row],
            tolerance = options.p_sum_tolerance,
            "p does not sum to 1"
        );
        return Err(Error::invalid_parameter("p", "p does not sum to 1"));
    }
    Ok(())
}

/// Count samples must be non-negative, sum to `n` and be integer-valued.
///
/// Checked in that order; the first violated constraint is reported.
/// `counts` must already be shape-compatible with the distribution.
pub fn validate_counts(
    counts: &NdArray,
    n: &NdArray,
    options: &DistributionOptions,
) -> Result<()> {
    if let Some(index) = first_negative(counts.data()) {
        debug!(index, value = counts.data()[index], "counts has negative components");
        return Err(Error::SampleConstraint(SampleConstraint::Negative));
    }

    let diffs = counts.sum_last_axis()?.zip_with(n, |total, n| total - n)?;
    if let Some(index) = first_mismatch(diffs.data(), options.count_sum_tolerance) {
        debug!(
            index,
            difference = diffs.data()[index],
            tolerance = options.count_sum_tolerance,
            "counts do not sum to n"
        );
        return Err(Error::SampleConstraint(SampleConstraint::SumMismatch));
    }

    if let Some(index) = first_non_integer(counts.data(), options.integer_tolerance) {
        debug!(index, value = counts.data()[index], "counts have non-integer components");
        return Err(Error::SampleConstraint(SampleConstraint::NonInteger));
    }
    Ok(())
}
