//! Core types for PSLQ runs: tuning parameters, relations, warnings

use crate::core::error::{PslqError, Result};
use rug::{Float, Integer};
use serde::{Deserialize, Serialize};

/// Lower bound for the order-reduction parameter γ, which must satisfy
/// γ > 2/√3 strictly.
pub const GAMMA_FLOOR: f64 = 1.154_700_538_379_251_5;

/// Default γ, slightly above the theoretical floor.
pub const DEFAULT_GAMMA: f64 = GAMMA_FLOOR + 0.01;

/// Tuning parameters for a PSLQ run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PslqParams {
    /// Order-reduction parameter γ > 2/√3. Larger values weight the pivot
    /// search toward later diagonal entries.
    pub gamma: f64,
    /// Exponent of the zero-detection threshold ε^(num/den) as a ratio
    /// (numerator, denominator). The empirical default is (15, 16).
    pub zero_exponent: (u32, u32),
    /// Multiple of the expected iteration count after which the run is
    /// aborted as a bug rather than allowed to spin.
    pub budget_slack: u64,
}

impl Default for PslqParams {
    fn default() -> Self {
        PslqParams {
            gamma: DEFAULT_GAMMA,
            zero_exponent: (15, 16),
            budget_slack: 10,
        }
    }
}

impl PslqParams {
    /// Create parameters with a custom γ
    pub fn with_gamma(gamma: f64) -> Self {
        PslqParams {
            gamma,
            ..Default::default()
        }
    }

    /// τ = 1/√(¼ + 1/γ²), the per-round contraction factor derived from γ
    pub fn tau(&self) -> f64 {
        1.0 / (0.25 + 1.0 / (self.gamma * self.gamma)).sqrt()
    }

    /// Validate γ and the derived τ
    pub fn validate(&self) -> Result<()> {
        if !self.gamma.is_finite() || self.gamma <= GAMMA_FLOOR {
            return Err(PslqError::GammaOutOfRange(self.gamma));
        }

        let tau = self.tau();
        if !(1.0 < tau && tau < 2.0) {
            return Err(PslqError::TauOutOfRange(tau));
        }

        if self.zero_exponent.1 == 0 || self.zero_exponent.0 > self.zero_exponent.1 {
            return Err(PslqError::invariant(format!(
                "zero-detection exponent {}/{} must be a ratio in (0, 1]",
                self.zero_exponent.0, self.zero_exponent.1
            )));
        }

        Ok(())
    }
}

/// Non-fatal diagnostics attached to a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Warning {
    /// The residual of the discovered relation exceeds 16·ε·Σ|rⱼxⱼ|; the
    /// input constants likely do not carry the full declared precision.
    LargeResidual,
    /// The certified norm bound decreased between rounds, which the exact
    /// algorithm never does.
    NormBoundDecreased,
}

/// One term of a discovered relation: an integer coefficient paired with
/// the input value it multiplies. Terms with zero coefficient are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTerm {
    pub coefficient: Integer,
    pub value: Float,
}

/// A discovered integer relation Σ rⱼ·xⱼ ≈ 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Non-zero terms, in the input order
    pub terms: Vec<RelationTerm>,
    /// Signed residual Σ rⱼ·xⱼ at the working precision
    pub residual: Float,
    /// Non-fatal diagnostics collected during the run
    pub warnings: Vec<Warning>,
}

impl Relation {
    /// Number of non-zero terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the relation carries no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Euclidean norm of the coefficient vector
    pub fn norm(&self) -> Float {
        let prec = self
            .terms
            .first()
            .map(|t| t.value.prec())
            .unwrap_or(53);
        let mut sum_sq = Integer::from(0);
        for term in &self.terms {
            sum_sq += Integer::from(&term.coefficient * &term.coefficient);
        }
        Float::with_val(prec, &sum_sq).sqrt()
    }

    /// True when the large-residual diagnostic was raised
    pub fn has_large_residual(&self) -> bool {
        self.warnings.contains(&Warning::LargeResidual)
    }

    /// Coefficients only, in term order
    pub fn coefficients(&self) -> Vec<Integer> {
        self.terms.iter().map(|t| t.coefficient.clone()).collect()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{}·{:.10e}", term.coefficient, term.value.to_f64())?;
            } else {
                let sign = if term.coefficient < 0 { '-' } else { '+' };
                let abs = Integer::from(term.coefficient.abs_ref());
                write!(f, " {} {}·{:.10e}", sign, abs, term.value.to_f64())?;
            }
        }
        write!(f, " = {:.3e}", self.residual.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = PslqParams::default();
        assert!(params.validate().is_ok());
        // The recommended default yields τ ≈ 1.154.
        assert!((params.tau() - 1.154).abs() < 2e-3);
    }

    #[test]
    fn test_gamma_at_floor_rejected() {
        let params = PslqParams::with_gamma(GAMMA_FLOOR);
        assert!(matches!(
            params.validate(),
            Err(PslqError::GammaOutOfRange(_))
        ));
    }

    #[test]
    fn test_gamma_nan_rejected() {
        let params = PslqParams::with_gamma(f64::NAN);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_relation_norm_and_display() {
        let prec = 64;
        let relation = Relation {
            terms: vec![
                RelationTerm {
                    coefficient: Integer::from(3),
                    value: Float::with_val(prec, 1),
                },
                RelationTerm {
                    coefficient: Integer::from(-4),
                    value: Float::with_val(prec, 1.5),
                },
            ],
            residual: Float::with_val(prec, 0),
            warnings: vec![],
        };
        assert_eq!(relation.len(), 2);
        let norm = relation.norm();
        assert!((norm.to_f64() - 5.0).abs() < 1e-12);
        let rendered = format!("{}", relation);
        assert!(rendered.contains("3·"));
        assert!(rendered.contains(" - 4·"));
    }
}
