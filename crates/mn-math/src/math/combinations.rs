//! Multinomial coefficients and per-row log-likelihood kernels.
//!
//! Counts are real-valued (integer-valued in practice) so that callers can
//! feed batched float arrays without conversion. Factorials are evaluated as
//! `lgamma(x + 1)`, which stays finite for trial counts far beyond the range
//! where `n!` overflows.

use super::stable::log_factorial;

/// log of the multinomial coefficient `n! / (c_1! ... c_K!)`.
///
/// `n` is the trial count and is not required to equal `sum(counts)`; the
/// coefficient is evaluated exactly as written so that a caller with
/// validation disabled gets the unguarded formula.
pub fn log_combinations(n: f64, counts: &[f64]) -> f64 {
    let log_denominator: f64 = counts.iter().map(|&c| log_factorial(c)).sum();
    log_factorial(n) - log_denominator
}

/// `x * ln(y)` with the convention `0 * ln(0) = 0`.
///
/// A positive `x` against `y = 0` still yields `-inf`.
pub fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 && !y.is_nan() {
        return 0.0;
    }
    x * y.ln()
}

/// Unnormalized log-probability of one count row: `sum_j c_j * ln(p_j)`.
pub fn log_unnormalized_row(counts: &[f64], probs: &[f64]) -> f64 {
    counts.iter().zip(probs).map(|(&c, &p)| xlogy(c, p)).sum()
}

/// Multinomial log-PMF for a single row.
///
/// log P = log(n!) - sum_j log(c_j!) + sum_j c_j ln(p_j)
pub fn multinomial_log_pmf_row(n: f64, counts: &[f64], probs: &[f64]) -> f64 {
    log_unnormalized_row(counts, probs) + log_combinations(n, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        if a.is_infinite() && b.is_infinite() {
            return a.is_sign_positive() == b.is_sign_positive();
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log_combinations_known_values() {
        // 4! / (1! 0! 3!) = 4
        assert!(approx_eq(log_combinations(4.0, &[1.0, 0.0, 3.0]), 4.0f64.ln(), 1e-10));
        // 3! / (1! 1! 1!) = 6
        assert!(approx_eq(log_combinations(3.0, &[1.0, 1.0, 1.0]), 6.0f64.ln(), 1e-10));
        // 10! / (2! 3! 5!) = 2520
        assert!(approx_eq(
            log_combinations(10.0, &[2.0, 3.0, 5.0]),
            2520.0f64.ln(),
            1e-9
        ));
    }

    #[test]
    fn log_combinations_single_class_is_zero() {
        assert!(approx_eq(log_combinations(7.0, &[7.0]), 0.0, 1e-10));
        assert_eq!(log_combinations(0.0, &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn log_combinations_permutation_invariant() {
        let a = log_combinations(12.0, &[5.0, 3.0, 4.0]);
        let b = log_combinations(12.0, &[4.0, 5.0, 3.0]);
        assert!(approx_eq(a, b, 1e-10));
    }

    #[test]
    fn log_combinations_large_n_is_finite() {
        let lc = log_combinations(10_000.0, &[2_500.0, 2_500.0, 5_000.0]);
        assert!(lc.is_finite());
        assert!(lc > 0.0);
    }

    #[test]
    fn xlogy_conventions() {
        assert_eq!(xlogy(0.0, 0.0), 0.0);
        assert_eq!(xlogy(2.0, 0.0), f64::NEG_INFINITY);
        assert!(approx_eq(xlogy(3.0, 0.5), 3.0 * 0.5f64.ln(), 1e-15));
        assert!(xlogy(0.0, f64::NAN).is_nan());
    }

    #[test]
    fn log_pmf_row_reference_scenario() {
        // n=4, p=[.2,.3,.5], counts=[1,0,3]
        let got = multinomial_log_pmf_row(4.0, &[1.0, 0.0, 3.0], &[0.2, 0.3, 0.5]);
        let expected = 4.0f64.ln() + 0.2f64.ln() + 3.0 * 0.5f64.ln();
        assert!(approx_eq(got, expected, 1e-10));
        // 4 * 0.2 * 0.5^3 = 0.1
        assert!(approx_eq(got, 0.1f64.ln(), 1e-4));
    }

    #[test]
    fn log_pmf_row_impossible_count_is_neg_inf() {
        let got = multinomial_log_pmf_row(2.0, &[1.0, 1.0], &[1.0, 0.0]);
        assert!(got.is_infinite() && got.is_sign_negative());
    }

    #[test]
    fn log_pmf_row_binomial_special_case() {
        // C(5,2) q^2 (1-q)^3
        let q: f64 = 0.3;
        let got = multinomial_log_pmf_row(5.0, &[2.0, 3.0], &[q, 1.0 - q]).exp();
        let expected = 10.0 * q.powi(2) * (1.0 - q).powi(3);
        assert!(approx_eq(got, expected, 1e-10));
    }
}
