//! Conversions between logits and probabilities over a single class axis.
//!
//! All functions operate on one row (the classes of one batch element);
//! callers iterate rows of a batched array.

use super::stable::log_sum_exp;

/// Numerically stable softmax of one row of logits.
///
/// The row maximum is subtracted before exponentiation so large logits do not
/// overflow. An empty row maps to an empty row.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let mut out = logits.to_vec();
    softmax_in_place(&mut out);
    out
}

/// In-place variant of [`softmax`].
pub fn softmax_in_place(row: &mut [f64]) {
    if row.is_empty() {
        return;
    }
    let max_val = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in row.iter_mut() {
        *v = (*v - max_val).exp();
        sum += *v;
    }
    let inv_sum = 1.0 / sum;
    for v in row.iter_mut() {
        *v *= inv_sum;
    }
}

/// log(softmax(logits)) computed without leaving log space.
pub fn log_softmax(logits: &[f64]) -> Vec<f64> {
    let lse = log_sum_exp(logits);
    logits.iter().map(|&x| x - lse).collect()
}

/// Logits of a normalized probability row: `ln(p_j)`.
///
/// Zero probabilities map to `-inf`, which softmax maps back to zero.
pub fn probs_to_logits(probs: &[f64]) -> Vec<f64> {
    probs.iter().map(|&p| p.ln()).collect()
}
