//! Precision helpers shared across the PSLQ state machine

use rug::Float;

/// Relative machine precision ε = 2^(1−p) for a p-bit mantissa
pub fn epsilon(prec: u32) -> Float {
    Float::with_val(prec, Float::i_exp(1, 1 - prec as i32))
}

/// √ε for a p-bit mantissa
pub fn sqrt_epsilon(prec: u32) -> Float {
    epsilon(prec).sqrt()
}

/// The zero-detection threshold ε^(num/den).
///
/// ε is an exact power of two, so the threshold is computed directly on the
/// exponent (rounded down, i.e. toward the tighter cut) rather than through
/// a transcendental power.
pub fn zero_threshold(prec: u32, num: u32, den: u32) -> Float {
    let exp = ((1 - i64::from(prec)) * i64::from(num)).div_euclid(i64::from(den));
    Float::with_val(prec, Float::i_exp(1, exp as i32))
}

/// Distance from `a` to `b` in units in the last place of `b`.
///
/// `b` must be the larger-magnitude, non-zero value of the pair. Returns
/// infinity when the distance overflows an `f64`, which callers treat as
/// "far apart".
pub fn ulp_distance(a: &Float, b: &Float) -> f64 {
    let prec = b.prec();
    let diff = Float::with_val(prec, a - b).abs();
    if diff.is_zero() {
        return 0.0;
    }
    let exp = match b.get_exp() {
        Some(e) => e,
        None => return f64::INFINITY,
    };
    // One ulp of b is 2^(exp − p) with MPFR's exponent convention.
    let ulp = Float::with_val(prec, Float::i_exp(1, exp - prec as i32));
    Float::with_val(prec, diff / ulp).to_f64()
}

/// Smallest precision carried by any of the values; the run executes at
/// this precision throughout.
pub fn working_precision(x: &[Float]) -> u32 {
    x.iter().map(Float::prec).min().unwrap_or(53)
}

/// Upper bound on the number of PSLQ rounds needed to certify `max_norm`:
/// ⌈C(n,2)·log(γⁿ⁻¹·max_norm)/log τ⌉.
///
/// Computed in f64; saturates instead of overflowing for extreme bounds.
pub fn expected_iterations(n: usize, max_norm: &Float, gamma: f64, tau: f64) -> u64 {
    let pairs = (n * (n - 1) / 2) as f64;
    let log_term = (n as f64 - 1.0) * gamma.ln() + max_norm.to_f64().ln();
    let bound = (pairs * log_term / tau.ln()).ceil();
    if !bound.is_finite() || bound >= u64::MAX as f64 {
        return u64::MAX;
    }
    if bound < 1.0 {
        1
    } else {
        bound as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsilon_is_relative_precision() {
        // For a 53-bit mantissa ε matches f64::EPSILON.
        let eps = epsilon(53);
        assert_eq!(eps.to_f64(), f64::EPSILON);
    }

    #[test]
    fn test_zero_threshold_between_eps_and_one() {
        let prec = 256;
        let threshold = zero_threshold(prec, 15, 16);
        let eps = epsilon(prec);
        assert!(threshold > eps);
        assert!(threshold < 1u32);
    }

    #[test]
    fn test_ulp_distance_adjacent() {
        let a = Float::with_val(64, 2).sqrt();
        let mut b = a.clone();
        b.next_up();
        let d = ulp_distance(&a, &b);
        assert!((d - 1.0).abs() < 1e-9, "adjacent floats are one ulp apart");
    }

    #[test]
    fn test_ulp_distance_far() {
        let a = Float::with_val(64, 1);
        let b = Float::with_val(64, 2);
        assert!(ulp_distance(&a, &b) > 1e15);
    }

    #[test]
    fn test_working_precision_minimum() {
        let x = vec![
            Float::with_val(128, 1),
            Float::with_val(64, 2),
            Float::with_val(256, 3),
        ];
        assert_eq!(working_precision(&x), 64);
    }

    #[test]
    fn test_expected_iterations_grows_with_bound() {
        let small = expected_iterations(3, &Float::with_val(64, 100), 1.16, 1.15);
        let large = expected_iterations(3, &Float::with_val(64, 1e10), 1.16, 1.15);
        assert!(small > 0);
        assert!(large > small);
    }
}
