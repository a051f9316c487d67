//! Evaluation options shared by every distribution instance.
//!
//! These correspond to the `[distribution]` table of `multinom.toml`:
//!
//! ```toml
//! [distribution]
//! validate_args = true
//! allow_nan_stats = false
//! integer_tolerance = 1e-8
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime switches and numeric tolerances for parameter and sample checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionOptions {
    /// Check `n`, `p` and count samples before computing. When false,
    /// results on invalid input are unspecified.
    pub validate_args: bool,

    /// Return NaN for batch members whose statistics are undefined instead
    /// of failing the whole call.
    pub allow_nan_stats: bool,

    /// Maximum distance from the nearest integer for `n` and counts.
    pub integer_tolerance: f64,

    /// Maximum deviation of `sum(p)` from 1 along the class axis.
    pub p_sum_tolerance: f64,

    /// Maximum deviation of `sum(counts)` from `n`.
    pub count_sum_tolerance: f64,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        DistributionOptions {
            validate_args: true,
            allow_nan_stats: false,
            integer_tolerance: 1e-8,
            p_sum_tolerance: 1e-6,
            count_sum_tolerance: 1e-8,
        }
    }
}

impl DistributionOptions {
    /// Options with every check disabled.
    pub fn unchecked() -> Self {
        DistributionOptions {
            validate_args: false,
            ..Self::default()
        }
    }

    /// Set `validate_args`.
    pub fn with_validate_args(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Set `allow_nan_stats`.
    pub fn with_allow_nan_stats(mut self, enabled: bool) -> Self {
        self.allow_nan_stats = enabled;
        self
    }

    /// Validate the options themselves.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("integer_tolerance", self.integer_tolerance),
            ("p_sum_tolerance", self.p_sum_tolerance),
            ("count_sum_tolerance", self.count_sum_tolerance),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(Error::Configuration(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}
