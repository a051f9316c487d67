//! Logits / probabilities parameterization.
//!
//! A categorical-style distribution is given either by per-class
//! probabilities `p` or by unnormalized log-odds `logits`. Whichever one is
//! supplied, the other is derived here:
//!
//! - `p` given: `logits = ln(p)` elementwise
//! - `logits` given: `p = softmax(logits)` over the last axis
//!
//! Normalization never touches leading (batch) axes.

use mn_common::{DistributionOptions, Error, Result};
use mn_math::{probs_to_logits, softmax_in_place};

use crate::checks;
use crate::tensor::NdArray;

/// The parameterization a caller supplies.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Per-class probabilities, last axis sums to 1.
    Probs(NdArray),
    /// Unnormalized log-probabilities.
    Logits(NdArray),
}

impl Param {
    /// Split into `(logits, p)` slots, exactly one of which is set.
    pub fn into_parts(self) -> (Option<NdArray>, Option<NdArray>) {
        match self {
            Param::Probs(p) => (None, Some(p)),
            Param::Logits(l) => (Some(l), None),
        }
    }
}

/// Derive the missing half of `(logits, p)`.
///
/// Exactly one of the inputs must be `Some`. With `validate_args`, a given
/// `p` must be non-negative and sum to 1 along the last axis.
pub fn get_logits_and_probs(
    logits: Option<NdArray>,
    p: Option<NdArray>,
    options: &DistributionOptions,
) -> Result<(NdArray, NdArray)> {
    match (logits, p) {
        (Some(_), Some(_)) => Err(Error::Configuration(
            "must pass exactly one of logits or p, got both".into(),
        )),
        (None, None) => Err(Error::Configuration(
            "must pass exactly one of logits or p, got neither".into(),
        )),
        (None, Some(p)) => {
            check_class_axis("p", &p)?;
            if options.validate_args {
                checks::validate_probs(&p, options)?;
            }
            let logits = NdArray::new(p.shape().to_vec(), probs_to_logits(p.data()))?;
            Ok((logits, p))
        }
        (Some(logits), None) => {
            check_class_axis("logits", &logits)?;
            let mut p = logits.clone();
            p.for_each_row_mut(softmax_in_place);
            Ok((logits, p))
        }
    }
}

fn check_class_axis(name: &str, values: &NdArray) -> Result<()> {
    match values.last_dim() {
        None => Err(Error::Shape(format!(
            "{} must have at least one dimension (the class axis)",
            name
        ))),
        Some(0) => Err(Error::Shape(format!("{} has an empty class axis", name))),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> DistributionOptions {
        DistributionOptions::default()
    }

    #[test]
    fn test_exactly_one_required() {
        let p = NdArray::from_vec(vec![0.5, 0.5]);
        let err = get_logits_and_probs(Some(p.clone()), Some(p), &opts()).unwrap_err();
        assert_eq!(err.code(), 10);

        let err = get_logits_and_probs(None, None, &opts()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_probs_to_logits() {
        let p = NdArray::from_vec(vec![0.25, 0.75]);
        let (logits, probs) = get_logits_and_probs(None, Some(p.clone()), &opts()).unwrap();
        assert_eq!(probs, p);
        assert!((logits.data()[0] - 0.25f64.ln()).abs() < 1e-12);
        assert!((logits.data()[1] - 0.75f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_logits_normalize_per_row() {
        let logits = NdArray::from_rows(&[vec![0.0, 0.0], vec![0.0, 2.0f64.ln()]]).unwrap();
        let (_, p) = get_logits_and_probs(Some(logits), None, &opts()).unwrap();
        assert_eq!(p.shape(), &[2, 2]);
        assert!((p.data()[0] - 0.5).abs() < 1e-12);
        assert!((p.data()[2] - 1.0 / 3.0).abs() < 1e-12);
        assert!((p.data()[3] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_large_logits_stay_finite() {
        let logits = NdArray::from_vec(vec![1000.0, 1000.0, 999.0]);
        let (_, p) = get_logits_and_probs(Some(logits), None, &opts()).unwrap();
        assert!(p.data().iter().all(|x| x.is_finite()));
        assert!((p.data().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_probs_rejected_only_when_validating() {
        let p = NdArray::from_vec(vec![0.5, 0.6]);
        let err = get_logits_and_probs(None, Some(p.clone()), &opts()).unwrap_err();
        assert_eq!(err.code(), 20);

        let unchecked = DistributionOptions::unchecked();
        assert!(get_logits_and_probs(None, Some(p), &unchecked).is_ok());
    }

    #[test]
    fn test_scalar_and_empty_rejected() {
        let err = get_logits_and_probs(None, Some(NdArray::scalar(1.0)), &opts()).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));

        let empty = NdArray::from_vec(Vec::new());
        let err = get_logits_and_probs(Some(empty), None, &opts()).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_param_into_parts() {
        let p = NdArray::from_vec(vec![1.0]);
        assert_eq!(Param::Probs(p.clone()).into_parts(), (None, Some(p.clone())));
        assert_eq!(Param::Logits(p.clone()).into_parts(), (Some(p), None));
    }
}
