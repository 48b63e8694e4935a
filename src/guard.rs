//! Input and parameter validation performed before any state is built

use crate::core::error::{PslqError, Result};
use crate::core::types::PslqParams;
use crate::utils;
use rug::Float;

/// Validation outcome: the derived contraction factor and the working
/// precision shared by the run.
#[derive(Debug, Clone)]
pub struct Validated {
    /// τ at working precision
    pub tau: Float,
    /// Working precision in bits (minimum over the inputs)
    pub prec: u32,
}

/// Validate the input vector, γ/τ, and the achievable norm bound.
///
/// The input must be a strictly increasing sequence of at least two
/// positive finite values. The algorithm is reflection invariant, so the
/// caller supplies |x|; a sign flip on any input changes the recovered
/// relation only by the corresponding sign.
pub fn validate(x: &[Float], max_norm: &Float, params: &PslqParams) -> Result<Validated> {
    if x.len() < 2 {
        return Err(PslqError::InputTooShort(x.len()));
    }

    for (index, value) in x.iter().enumerate() {
        if value.is_zero() {
            return Err(PslqError::InputHasZero { index });
        }
        if !value.is_finite() || *value < 0 {
            return Err(PslqError::InputNonPositive { index });
        }
    }

    for index in 1..x.len() {
        if x[index] <= x[index - 1] {
            return Err(PslqError::InputNotSorted { index });
        }
    }

    params.validate()?;

    let prec = utils::working_precision(x);
    let tau = {
        let gamma = Float::with_val(prec, params.gamma);
        let mut t = Float::with_val(prec, 0.25);
        t += Float::with_val(prec, 1) / Float::with_val(prec, &gamma * &gamma);
        Float::with_val(prec, 1) / t.sqrt()
    };

    let mut norm_sq = Float::with_val(prec, 0);
    for value in x {
        norm_sq += Float::with_val(prec, value * value);
    }

    if max_norm.is_sign_negative() || max_norm.is_zero() || !max_norm.is_finite() {
        return Err(PslqError::precision_insufficient(
            "the norm bound must be a positive finite value",
        ));
    }

    // Beyond 1/√(‖x‖²·ε) any recovered "zero" is indistinguishable from
    // round-off and the run would report spurious relations.
    let eps = utils::epsilon(prec);
    let budget = Float::with_val(prec, max_norm * max_norm);
    let budget = budget * &norm_sq;
    let ceiling = Float::with_val(prec, 1) / &eps;
    if budget >= ceiling {
        let achievable = Float::with_val(prec, &norm_sq * &eps);
        let achievable = Float::with_val(prec, 1) / achievable.sqrt();
        return Err(PslqError::precision_insufficient_with_bound(
            format!(
                "the requested norm bound {} is too large for {}-bit inputs",
                max_norm.to_f64(),
                prec
            ),
            achievable,
        ));
    }

    Ok(Validated { tau, prec })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(prec: u32, raw: &[f64]) -> Vec<Float> {
        raw.iter().map(|&v| Float::with_val(prec, v)).collect()
    }

    #[test]
    fn test_accepts_sorted_positive_input() {
        let x = values(128, &[0.5, 1.0, 2.5]);
        let max_norm = Float::with_val(128, 1e6);
        let checked = validate(&x, &max_norm, &PslqParams::default()).unwrap();
        assert_eq!(checked.prec, 128);
        assert!(checked.tau > 1u32);
        assert!(checked.tau < 2u32);
    }

    #[test]
    fn test_rejects_short_input() {
        let x = values(64, &[1.0]);
        let max_norm = Float::with_val(64, 100);
        assert!(matches!(
            validate(&x, &max_norm, &PslqParams::default()),
            Err(PslqError::InputTooShort(1))
        ));
    }

    #[test]
    fn test_rejects_unsorted_input() {
        let x = values(64, &[2.0, 1.0, 3.0]);
        let max_norm = Float::with_val(64, 100);
        assert!(matches!(
            validate(&x, &max_norm, &PslqParams::default()),
            Err(PslqError::InputNotSorted { index: 1 })
        ));
    }

    #[test]
    fn test_rejects_duplicate_input() {
        let x = values(64, &[1.0, 1.0, 3.0]);
        let max_norm = Float::with_val(64, 100);
        assert!(matches!(
            validate(&x, &max_norm, &PslqParams::default()),
            Err(PslqError::InputNotSorted { index: 1 })
        ));
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        let max_norm = Float::with_val(64, 100);
        let x = values(64, &[0.0, 1.0]);
        assert!(matches!(
            validate(&x, &max_norm, &PslqParams::default()),
            Err(PslqError::InputHasZero { index: 0 })
        ));
        let x = values(64, &[-1.0, 2.0]);
        assert!(matches!(
            validate(&x, &max_norm, &PslqParams::default()),
            Err(PslqError::InputNonPositive { index: 0 })
        ));
    }

    #[test]
    fn test_rejects_bad_gamma() {
        let x = values(64, &[1.0, 2.0]);
        let max_norm = Float::with_val(64, 100);
        let params = PslqParams::with_gamma(1.0);
        assert!(matches!(
            validate(&x, &max_norm, &params),
            Err(PslqError::GammaOutOfRange(_))
        ));
    }

    #[test]
    fn test_norm_bound_beyond_precision() {
        // 64-bit inputs certify bounds up to roughly 2^31/‖x‖; 10^10 must
        // be rejected and the error must carry the achievable bound.
        let x = values(64, &[1.0, 2.0]);
        let max_norm = Float::with_val(64, 1e10);
        match validate(&x, &max_norm, &PslqParams::default()) {
            Err(PslqError::PrecisionInsufficient {
                max_norm_bound: Some(bound),
                ..
            }) => {
                assert!(bound.to_f64() < 1e10);
                assert!(bound.to_f64() > 1.0);
            }
            other => panic!("expected PrecisionInsufficient, got {:?}", other),
        }
    }

    #[test]
    fn test_norm_bound_within_precision() {
        let x = values(256, &[1.0, 2.0]);
        let max_norm = Float::with_val(256, 1e10);
        assert!(validate(&x, &max_norm, &PslqParams::default()).is_ok());
    }
}
