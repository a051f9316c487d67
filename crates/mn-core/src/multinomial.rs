//! Multinomial distribution.
//!
//! Parameterized by a trial count `n` and either class probabilities `p` or
//! `logits`, with arbitrary leading batch axes:
//!
//! ```text
//! P(counts) = n! / (c_1! ... c_K!) * p_1^c_1 * ... * p_K^c_K
//! ```
//!
//! `n` has shape `[B..]`, `p` has shape `[B.., K]` and the two broadcast.
//! Each count sample has shape `[S.., K]` broadcastable against `p`.
//!
//! # Example
//!
//! ```ignore
//! use mn_core::{Multinomial, NdArray, Param};
//!
//! // A loaded die rolled 4 times.
//! let m = Multinomial::new(4.0, Param::Probs([0.2, 0.3, 0.5].into()))?;
//! let lp = m.log_prob(&NdArray::from_vec(vec![1.0, 0.0, 3.0]))?;
//! ```

use std::collections::BTreeMap;

use mn_common::{DistributionOptions, Error, Result};
use mn_math::multinomial_log_pmf_row;
use tracing::{debug, trace};

use crate::checks;
use crate::distribution::Distribution;
use crate::params::{get_logits_and_probs, Param};
use crate::tensor::{BroadcastIndexer, NdArray};

/// Name used when the caller does not supply one.
pub const DEFAULT_NAME: &str = "Multinomial";

/// A batch of multinomial distributions.
///
/// Immutable after construction. The mean and batch shape are computed once
/// and reused by every query.
#[derive(Debug, Clone)]
pub struct Multinomial {
    n: NdArray,
    logits: NdArray,
    p: NdArray,
    mean: NdArray,
    batch_shape: Vec<usize>,
    event_shape: Vec<usize>,
    /// Flat batch indices where `n` or `p` is non-finite.
    undefined: Vec<usize>,
    options: DistributionOptions,
    name: String,
}

impl Multinomial {
    /// Build with default options.
    pub fn new(n: impl Into<NdArray>, param: Param) -> Result<Self> {
        Self::builder(n).param(param).build()
    }

    /// Build from optional `logits` / `p` slots. Exactly one must be set.
    pub fn from_parts(
        n: NdArray,
        logits: Option<NdArray>,
        p: Option<NdArray>,
        options: DistributionOptions,
    ) -> Result<Self> {
        Self::construct(n, logits, p, options, DEFAULT_NAME.to_string())
    }

    pub fn builder(n: impl Into<NdArray>) -> MultinomialBuilder {
        MultinomialBuilder::new(n)
    }

    fn construct(
        n: NdArray,
        logits: Option<NdArray>,
        p: Option<NdArray>,
        options: DistributionOptions,
        name: String,
    ) -> Result<Self> {
        options.validate()?;
        let (logits, p) = get_logits_and_probs(logits, p, &options)?;
        if options.validate_args {
            checks::validate_n(&n, &options)?;
        }

        let mean = n.expand_last().zip_with(&p, |n, p| n * p)?;
        let batch_shape = mean.leading_shape().to_vec();
        let event_shape = p.last_dim().into_iter().collect::<Vec<_>>();
        let undefined = undefined_members(&n, &p)?;

        debug!(
            name = %name,
            batch_shape = ?batch_shape,
            event_size = event_shape[0],
            validate_args = options.validate_args,
            allow_nan_stats = options.allow_nan_stats,
            "constructed multinomial"
        );

        Ok(Multinomial {
            n,
            logits,
            p,
            mean,
            batch_shape,
            event_shape,
            undefined,
            options,
            name,
        })
    }

    /// Number of trials.
    pub fn n(&self) -> &NdArray {
        &self.n
    }

    /// Class probabilities, shape `[B.., K]`.
    pub fn p(&self) -> &NdArray {
        &self.p
    }

    /// Log-odds, shape `[B.., K]`.
    pub fn logits(&self) -> &NdArray {
        &self.logits
    }

    pub fn options(&self) -> &DistributionOptions {
        &self.options
    }

    pub fn validate_args(&self) -> bool {
        self.options.validate_args
    }

    pub fn allow_nan_stats(&self) -> bool {
        self.options.allow_nan_stats
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch_shape(&self) -> &[usize] {
        &self.batch_shape
    }

    /// `[K]`.
    pub fn event_shape(&self) -> &[usize] {
        &self.event_shape
    }

    /// Number of classes `K`.
    pub fn event_size(&self) -> usize {
        self.event_shape[0]
    }

    pub fn is_continuous(&self) -> bool {
        false
    }

    /// Check that `counts` lies in the support.
    ///
    /// The class axis and batch broadcasting are always checked. Sign, sum
    /// and integrality are checked only with `validate_args`.
    pub fn assert_valid_sample(&self, counts: &NdArray) -> Result<()> {
        self.sample_indexer(counts)?;
        if self.options.validate_args {
            checks::validate_counts(counts, &self.n, &self.options)?;
        }
        Ok(())
    }

    /// Log probability mass of `counts`.
    ///
    /// `counts` has shape `[S.., K]`; the result has the broadcast of
    /// `S..`, the batch axes of `p` and the shape of `n`. With
    /// `validate_args`, invalid samples fail before anything is computed.
    pub fn log_prob(&self, counts: &NdArray) -> Result<NdArray> {
        let indexer = self.sample_indexer(counts)?;
        if self.options.validate_args {
            checks::validate_counts(counts, &self.n, &self.options)?;
        }

        let n = self.n.data();
        let data = (0..indexer.len())
            .map(|i| {
                multinomial_log_pmf_row(
                    n[indexer.offset(2, i)],
                    counts.row(indexer.offset(0, i)),
                    self.p.row(indexer.offset(1, i)),
                )
            })
            .collect();

        trace!(name = %self.name, shape = ?indexer.shape(), "log_prob");
        NdArray::new(indexer.shape().to_vec(), data)
    }

    /// Probability mass of `counts`: `exp(log_prob(counts))`.
    pub fn prob(&self, counts: &NdArray) -> Result<NdArray> {
        Ok(self.log_prob(counts)?.map(f64::exp))
    }

    /// `n[..., None] * p`, shape `[B.., K]`.
    pub fn mean(&self) -> Result<NdArray> {
        trace!(name = %self.name, "mean");
        self.guard_statistic("mean", self.mean.clone(), self.event_size())
    }

    /// Covariance matrices, shape `[B.., K, K]`.
    ///
    /// `Cov[i, i] = n p_i (1 - p_i)` and `Cov[i, j] = -n p_i p_j`.
    pub fn variance(&self) -> Result<NdArray> {
        let p = self.broadcast_probs()?;
        let mut cov = self.mean.outer(&p)?.map(|x| -x);
        let diag = self.mean.zip_with(&p, |m, p| m - m * p)?;
        cov.set_diag(&diag)?;

        trace!(name = %self.name, shape = ?cov.shape(), "variance");
        let k = self.event_size();
        self.guard_statistic("variance", cov, k * k)
    }

    /// Per-class variances `n p (1 - p)`, shape `[B.., K]`.
    pub fn marginal_variance(&self) -> Result<NdArray> {
        let p = self.broadcast_probs()?;
        let diag = self.mean.zip_with(&p, |m, p| m - m * p)?;
        self.guard_statistic("marginal_variance", diag, self.event_size())
    }

    /// Per-class standard deviations, shape `[B.., K]`.
    pub fn stddev(&self) -> Result<NdArray> {
        let var = self.marginal_variance().map_err(|err| match err {
            Error::UndefinedStatistic { batch_index, .. } => Error::UndefinedStatistic {
                statistic: "stddev",
                batch_index,
            },
            other => other,
        })?;
        Ok(var.map(f64::sqrt))
    }

    /// Parameters keyed by name: `logits`, `mean`, `n`, `p`.
    pub fn parameters(&self) -> BTreeMap<&'static str, NdArray> {
        BTreeMap::from([
            ("n", self.n.clone()),
            ("p", self.p.clone()),
            ("logits", self.logits.clone()),
            ("mean", self.mean.clone()),
        ])
    }

    /// Indexer over `(counts rows, p rows, n)` for the output of `log_prob`.
    fn sample_indexer(&self, counts: &NdArray) -> Result<BroadcastIndexer> {
        let k = self.event_size();
        if counts.last_dim() != Some(k) {
            return Err(Error::Shape(format!(
                "counts must have {} classes on the last axis, got shape {:?}",
                k,
                counts.shape()
            )));
        }
        BroadcastIndexer::new(&[
            counts.leading_shape(),
            self.p.leading_shape(),
            self.n.shape(),
        ])
    }

    /// `p` broadcast against `n`, i.e. `p * ones_like(n)[..., None]`.
    fn broadcast_probs(&self) -> Result<NdArray> {
        let ones = NdArray::ones_like(&self.n).expand_last();
        self.p.zip_with(&ones, |p, one| p * one)
    }

    /// Apply the undefined-statistic policy to a per-member block layout.
    fn guard_statistic(
        &self,
        statistic: &'static str,
        mut values: NdArray,
        per_member: usize,
    ) -> Result<NdArray> {
        let Some(&first) = self.undefined.first() else {
            return Ok(values);
        };
        if !self.options.allow_nan_stats {
            debug!(
                name = %self.name,
                statistic,
                batch_index = first,
                undefined = self.undefined.len(),
                "statistic undefined"
            );
            return Err(Error::UndefinedStatistic {
                statistic,
                batch_index: first,
            });
        }
        for &member in &self.undefined {
            values.fill_nan(member * per_member, per_member);
        }
        Ok(values)
    }
}

/// Batch members (flat, over the broadcast of `n` and `p`'s batch axes)
/// whose parameters contain a non-finite value.
fn undefined_members(n: &NdArray, p: &NdArray) -> Result<Vec<usize>> {
    let indexer = BroadcastIndexer::new(&[n.shape(), p.leading_shape()])?;
    Ok((0..indexer.len())
        .filter(|&i| {
            !n.data()[indexer.offset(0, i)].is_finite()
                || p.row(indexer.offset(1, i)).iter().any(|x| !x.is_finite())
        })
        .collect())
}

impl Distribution for Multinomial {
    fn name(&self) -> &str {
        Multinomial::name(self)
    }

    fn batch_shape(&self) -> &[usize] {
        Multinomial::batch_shape(self)
    }

    fn event_shape(&self) -> &[usize] {
        Multinomial::event_shape(self)
    }

    fn log_prob(&self, value: &NdArray) -> Result<NdArray> {
        Multinomial::log_prob(self, value)
    }

    fn mean(&self) -> Result<NdArray> {
        Multinomial::mean(self)
    }

    fn variance(&self) -> Result<NdArray> {
        Multinomial::variance(self)
    }

    fn is_continuous(&self) -> bool {
        false
    }
}

/// Builder for [`Multinomial`].
#[derive(Debug, Clone)]
pub struct MultinomialBuilder {
    n: NdArray,
    logits: Option<NdArray>,
    p: Option<NdArray>,
    options: DistributionOptions,
    name: String,
}

impl MultinomialBuilder {
    pub fn new(n: impl Into<NdArray>) -> Self {
        MultinomialBuilder {
            n: n.into(),
            logits: None,
            p: None,
            options: DistributionOptions::default(),
            name: DEFAULT_NAME.to_string(),
        }
    }

    pub fn probs(mut self, p: impl Into<NdArray>) -> Self {
        self.p = Some(p.into());
        self
    }

    pub fn logits(mut self, logits: impl Into<NdArray>) -> Self {
        self.logits = Some(logits.into());
        self
    }

    pub fn param(self, param: Param) -> Self {
        match param {
            Param::Probs(p) => self.probs(p),
            Param::Logits(l) => self.logits(l),
        }
    }

    /// Replace all options at once. Later `validate_args` / `allow_nan_stats`
    /// calls still apply on top.
    pub fn options(mut self, options: DistributionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate_args(mut self, enabled: bool) -> Self {
        self.options.validate_args = enabled;
        self
    }

    pub fn allow_nan_stats(mut self, enabled: bool) -> Self {
        self.options.allow_nan_stats = enabled;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn build(self) -> Result<Multinomial> {
        Multinomial::construct(self.n, self.logits, self.p, self.options, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mn_common::SampleConstraint;

    fn approx(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol)
    }

    fn die() -> Multinomial {
        Multinomial::new(4.0, Param::Probs([0.2, 0.3, 0.5].into())).unwrap()
    }

    #[test]
    fn test_shapes() {
        let m = die();
        assert_eq!(m.batch_shape(), &[] as &[usize]);
        assert_eq!(m.event_shape(), &[3]);
        assert_eq!(m.event_size(), 3);

        let batched = Multinomial::new(
            NdArray::from_vec(vec![2.0, 5.0]),
            Param::Probs([0.5, 0.5].into()),
        )
        .unwrap();
        assert_eq!(batched.batch_shape(), &[2]);
        assert_eq!(batched.extended_shape(&[10]), vec![10, 2, 2]);
    }

    #[test]
    fn test_defaults() {
        let m = die();
        assert_eq!(m.name(), "Multinomial");
        assert!(m.validate_args());
        assert!(!m.allow_nan_stats());
        assert!(!m.is_continuous());
    }

    #[test]
    fn test_from_parts_requires_exactly_one() {
        let p = NdArray::from_vec(vec![0.5, 0.5]);
        let both = Multinomial::from_parts(
            NdArray::scalar(1.0),
            Some(p.clone()),
            Some(p),
            DistributionOptions::default(),
        );
        assert!(matches!(both, Err(Error::Configuration(_))));

        let neither = Multinomial::from_parts(
            NdArray::scalar(1.0),
            None,
            None,
            DistributionOptions::default(),
        );
        assert!(matches!(neither, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_builder_options() {
        let m = Multinomial::builder(3.0)
            .logits([0.0, 1.0])
            .validate_args(false)
            .allow_nan_stats(true)
            .name("Dice")
            .build()
            .unwrap();
        assert_eq!(m.name(), "Dice");
        assert!(!m.validate_args());
        assert!(m.allow_nan_stats());
    }

    #[test]
    fn test_builder_rejects_bad_options() {
        let opts = DistributionOptions {
            p_sum_tolerance: -1.0,
            ..Default::default()
        };
        let err = Multinomial::builder(1.0)
            .probs([1.0])
            .options(opts)
            .build()
            .unwrap_err();
        assert_eq!(err.code(), 10);
    }

    #[test]
    fn test_invalid_n() {
        let err = Multinomial::new(-1.0, Param::Probs([0.5, 0.5].into())).unwrap_err();
        assert!(err.to_string().contains("n has negative components"));

        let err = Multinomial::new(1.5, Param::Probs([0.5, 0.5].into())).unwrap_err();
        assert!(err.to_string().contains("n has non-integer components"));

        // Unchecked construction accepts it.
        let m = Multinomial::builder(1.5)
            .probs([0.5, 0.5])
            .validate_args(false)
            .build();
        assert!(m.is_ok());
    }

    #[test]
    fn test_incompatible_shapes() {
        let err = Multinomial::new(
            NdArray::from_vec(vec![1.0, 2.0, 3.0]),
            Param::Probs(NdArray::from_rows(&[vec![0.5, 0.5], vec![0.5, 0.5]]).unwrap()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_log_prob_reference_value() {
        // 4!/(1! 0! 3!) * 0.2 * 0.5^3 = 0.1
        let lp = die().log_prob(&[1.0, 0.0, 3.0].into()).unwrap();
        assert_eq!(lp.rank(), 0);
        assert!((lp.data()[0] - 0.1f64.ln()).abs() < 1e-10);

        let p = die().prob(&[1.0, 0.0, 3.0].into()).unwrap();
        assert!((p.data()[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_log_prob_zero_probability() {
        let m = Multinomial::new(2.0, Param::Probs([1.0, 0.0].into())).unwrap();
        let lp = m.log_prob(&[2.0, 0.0].into()).unwrap();
        assert!(lp.data()[0].abs() < 1e-12);
        let lp = m.log_prob(&[1.0, 1.0].into()).unwrap();
        assert_eq!(lp.data()[0], f64::NEG_INFINITY);
    }

    #[test]
    fn test_log_prob_wrong_class_count() {
        let err = die().log_prob(&[1.0, 3.0].into()).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));

        let err = die().log_prob(&NdArray::scalar(4.0)).unwrap_err();
        assert!(matches!(err, Error::Shape(_)));
    }

    #[test]
    fn test_log_prob_sample_constraints() {
        let m = die();
        assert!(matches!(
            m.log_prob(&[-1.0, 2.0, 3.0].into()),
            Err(Error::SampleConstraint(SampleConstraint::Negative))
        ));
        assert!(matches!(
            m.log_prob(&[1.0, 1.0, 1.0].into()),
            Err(Error::SampleConstraint(SampleConstraint::SumMismatch))
        ));
        assert!(matches!(
            m.log_prob(&[0.5, 0.5, 3.0].into()),
            Err(Error::SampleConstraint(SampleConstraint::NonInteger))
        ));
    }

    #[test]
    fn test_assert_valid_sample() {
        let m = die();
        assert!(m.assert_valid_sample(&[1.0, 0.0, 3.0].into()).is_ok());
        assert!(matches!(
            m.assert_valid_sample(&[2.0, 2.0, 2.0].into()),
            Err(Error::SampleConstraint(SampleConstraint::SumMismatch))
        ));

        let unchecked = Multinomial::builder(4.0)
            .probs([0.2, 0.3, 0.5])
            .validate_args(false)
            .build()
            .unwrap();
        assert!(unchecked.assert_valid_sample(&[2.0, 2.0, 2.0].into()).is_ok());
        // Shape is structural and checked regardless.
        assert!(matches!(
            unchecked.assert_valid_sample(&[2.0, 2.0].into()),
            Err(Error::Shape(_))
        ));
    }

    #[test]
    fn test_unchecked_log_prob_evaluates_formula() {
        let m = Multinomial::builder(4.0)
            .probs([0.2, 0.3, 0.5])
            .validate_args(false)
            .build()
            .unwrap();
        let lp = m.log_prob(&[1.0, 1.0, 1.0].into()).unwrap();
        assert!(lp.data()[0].is_finite());
    }

    #[test]
    fn test_mean() {
        let mean = die().mean().unwrap();
        assert_eq!(mean.shape(), &[3]);
        assert!(approx(mean.data(), &[0.8, 1.2, 2.0], 1e-12));
    }

    #[test]
    fn test_variance() {
        let cov = die().variance().unwrap();
        assert_eq!(cov.shape(), &[3, 3]);
        let expected = [
            0.64, -0.24, -0.4, //
            -0.24, 0.84, -0.6, //
            -0.4, -0.6, 1.0,
        ];
        assert!(approx(cov.data(), &expected, 1e-12));
    }

    #[test]
    fn test_variance_broadcasts_p_against_n() {
        let m = Multinomial::new(
            NdArray::from_vec(vec![1.0, 2.0]),
            Param::Probs([0.5, 0.5].into()),
        )
        .unwrap();
        let cov = m.variance().unwrap();
        assert_eq!(cov.shape(), &[2, 2, 2]);
        assert!(approx(
            cov.data(),
            &[0.25, -0.25, -0.25, 0.25, 0.5, -0.5, -0.5, 0.5],
            1e-12
        ));
    }

    #[test]
    fn test_marginal_variance_and_stddev() {
        let m = die();
        let var = m.marginal_variance().unwrap();
        assert!(approx(var.data(), &[0.64, 0.84, 1.0], 1e-12));
        let sd = m.stddev().unwrap();
        assert!(approx(sd.data(), &[0.8, 0.84f64.sqrt(), 1.0], 1e-12));
    }

    #[test]
    fn test_parameters() {
        let params = die().parameters();
        let keys: Vec<_> = params.keys().copied().collect();
        assert_eq!(keys, vec!["logits", "mean", "n", "p"]);
        assert!((params["logits"].data()[0] - 0.2f64.ln()).abs() < 1e-12);
    }

    fn nan_logits() -> MultinomialBuilder {
        Multinomial::builder(2.0).logits(
            NdArray::from_rows(&[vec![0.0, 0.0], vec![f64::NAN, 0.0]]).unwrap(),
        )
    }

    #[test]
    fn test_undefined_statistic_error() {
        let m = nan_logits().build().unwrap();
        match m.mean().unwrap_err() {
            Error::UndefinedStatistic {
                statistic,
                batch_index,
            } => {
                assert_eq!(statistic, "mean");
                assert_eq!(batch_index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(m.variance().unwrap_err().code(), 40);
        assert!(m.stddev().unwrap_err().to_string().starts_with("stddev"));
    }

    #[test]
    fn test_undefined_statistic_nan() {
        let m = nan_logits().allow_nan_stats(true).build().unwrap();
        let mean = m.mean().unwrap();
        assert!(approx(&mean.data()[..2], &[1.0, 1.0], 1e-12));
        assert!(mean.data()[2..].iter().all(|x| x.is_nan()));

        let cov = m.variance().unwrap();
        assert!(approx(&cov.data()[..4], &[0.5, -0.5, -0.5, 0.5], 1e-12));
        assert!(cov.data()[4..].iter().all(|x| x.is_nan()));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Multinomial>();
    }

    #[test]
    fn test_trait_object() {
        let m = die();
        let d: &dyn Distribution = &m;
        let p = d.prob(&[1.0, 0.0, 3.0].into()).unwrap();
        assert!((p.data()[0] - 0.1).abs() < 1e-12);
        assert_eq!(d.event_shape(), &[3]);
    }
}
