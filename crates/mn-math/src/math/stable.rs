//! Numerically stable primitives for log-domain count likelihoods.

use std::f64::consts::PI;

/// ln(sqrt(2 pi))
const LOG_SQRT_2PI: f64 = 0.918_938_533_204_672_8;
const LANCZOS_G: f64 = 7.0;
#[allow(clippy::excessive_precision)]
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// `ln(sum(exp(values)))` without overflow.
///
/// Empty input and all `-inf` input give `-inf`; any NaN gives NaN.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_nan() {
            return f64::NAN;
        }
        if v > max {
            max = v;
        }
    }
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|&v| (v - max).exp()).sum::<f64>().ln()
}

/// `ln|Gamma(z)|` via the Lanczos series (g = 7, 9 terms).
///
/// Arguments below 0.5 go through the reflection formula. Poles at zero and
/// the negative integers give NaN.
pub fn log_gamma(z: f64) -> f64 {
    if z.is_nan() || z == f64::NEG_INFINITY {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return z;
    }
    if z <= 0.0 && z == z.floor() {
        return f64::NAN;
    }
    if z < 0.5 {
        // Gamma(z) Gamma(1 - z) = pi / sin(pi z)
        return PI.ln() - (PI * z).sin().abs().ln() - log_gamma(1.0 - z);
    }

    let z = z - 1.0;
    let t = z + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFS[0], |acc, (i, c)| acc + c / (z + (i + 1) as f64));
    LOG_SQRT_2PI + (z + 0.5) * t.ln() - t + series.ln()
}

/// Same as [`log_gamma`], under the C library name.
pub fn lgamma(x: f64) -> f64 {
    log_gamma(x)
}

/// log(x!) = lgamma(x + 1) for a real-valued count.
///
/// Exact zero at 0 and 1 so that empty classes add nothing to a coefficient.
/// Negative counts have no factorial and yield NaN.
pub fn log_factorial(x: f64) -> f64 {
    if x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 || x == 1.0 {
        return 0.0;
    }
    log_gamma(x + 1.0)
}

/// `ln C(n, k)`; `-inf` when `k > n`.
pub fn log_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    if k == 0 || k == n {
        return 0.0;
    }
    log_factorial(n as f64) - log_factorial(k as f64) - log_factorial((n - k) as f64)
}

/// Whether `x` is within `tol` of the nearest integer.
///
/// Non-finite values are never integer-valued.
pub fn is_integer_valued(x: f64, tol: f64) -> bool {
    x.is_finite() && (x - x.round()).abs() <= tol
}
