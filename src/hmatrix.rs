//! Construction of the normalised vector y and the lower-trapezoidal
//! matrix H from the input values
//!
//! Follows section 3 of Ferguson, Bailey, Arno, "Analysis of PSLQ"
//! (https://www.davidhbailey.com/dhbpapers/cpslq.pdf). With suffix sums
//! s²ᵢ = Σ_{k≥i} xₖ², the matrix
//!
//!   Hᵢᵢ = √(s²ᵢ₊₁/s²ᵢ),   Hᵢⱼ = −xᵢxⱼ/√(s²ⱼ·s²ⱼ₊₁) for i > j
//!
//! satisfies ‖H‖²_F = n−1 and yᵀH = 0 for y = x/‖x‖₂. Both identities are
//! verified numerically after construction; a failure there is a bug, not
//! a property of the input.

use crate::core::error::{PslqError, Result};
use crate::core::matrix::RealMatrix;
use crate::utils;
use rug::Float;

/// The geometric state produced from a validated input vector
#[derive(Debug, Clone)]
pub struct HBasis {
    /// Unit-norm image of the input, mutated by every reduction step
    pub y: Vec<Float>,
    /// n × (n−1) lower-trapezoidal matrix
    pub h: RealMatrix,
}

impl HBasis {
    /// Build y and H from validated, strictly increasing positive values
    pub fn from_values(x: &[Float], prec: u32) -> Result<Self> {
        let n = x.len();

        // Suffix sums of squares, then their roots; s[0] is ‖x‖₂.
        let mut s_sq = vec![Float::with_val(prec, 0); n];
        s_sq[n - 1] = Float::with_val(prec, &x[n - 1] * &x[n - 1]);
        for i in (0..n - 1).rev() {
            let sq = Float::with_val(prec, &x[i] * &x[i]);
            s_sq[i] = Float::with_val(prec, &s_sq[i + 1] + &sq);
        }
        let s: Vec<Float> = s_sq.iter().map(|v| v.clone().sqrt()).collect();

        let y: Vec<Float> = x
            .iter()
            .map(|v| Float::with_val(prec, v / &s[0]))
            .collect();

        let mut h = RealMatrix::zeros(prec, n, n - 1)?;
        for i in 0..n {
            if i < n - 1 {
                h.set(i, i, Float::with_val(prec, &s[i + 1] / &s[i]));
            }
            for j in 0..i.min(n - 1) {
                let denom = Float::with_val(prec, &s[j] * &s[j + 1]);
                let num = Float::with_val(prec, &x[i] * &x[j]);
                h.set(i, j, -Float::with_val(prec, num / denom));
            }
        }

        let basis = HBasis { y, h };
        basis.verify(prec)?;
        Ok(basis)
    }

    /// Post-construction checks, in order of caller actionability: first
    /// the precision diagnostics the caller can fix, then the algebraic
    /// identities whose failure means a bug here.
    fn verify(&self, prec: u32) -> Result<()> {
        let n = self.y.len();
        let eps = utils::epsilon(prec);
        let sqrt_eps = utils::sqrt_epsilon(prec);

        for (i, value) in self.y.iter().enumerate() {
            if value.clone().abs() < eps {
                return Err(PslqError::precision_insufficient(format!(
                    "normalised input y[{}] underflows the precision floor; \
                     more precision is required",
                    i
                )));
            }
        }

        // y inherits the input's strict ordering, so consecutive entries
        // are the closest pairs. Indistinguishable entries would make the
        // diagonal of H collapse.
        for i in 1..n {
            let distance = utils::ulp_distance(&self.y[i - 1], &self.y[i]);
            if distance <= 2.0 {
                return Err(PslqError::precision_insufficient(format!(
                    "inputs {} and {} are {} ulps apart and cannot be \
                     distinguished at {} bits",
                    i - 1,
                    i,
                    distance,
                    prec
                )));
            }
        }

        let nm1 = Float::with_val(prec, (n - 1) as u32);
        let mut defect = self.h.frobenius_norm_sq();
        defect -= &nm1;
        let tolerance = Float::with_val(prec, &sqrt_eps * &nm1);
        if defect.abs() > tolerance {
            return Err(PslqError::invariant(format!(
                "‖H‖²_F deviates from n−1 = {} beyond round-off",
                n - 1
            )));
        }

        for j in 0..n - 1 {
            let mut dot = Float::with_val(prec, 0);
            for i in 0..n {
                dot += Float::with_val(prec, &self.y[i] * self.h.at(i, j));
            }
            let scaled = Float::with_val(prec, dot.abs() / &nm1);
            if scaled > sqrt_eps {
                return Err(PslqError::invariant(format!(
                    "yᵀH is not numerically zero in column {}",
                    j
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis_for(prec: u32, raw: &[f64]) -> HBasis {
        let x: Vec<Float> = raw.iter().map(|&v| Float::with_val(prec, v)).collect();
        HBasis::from_values(&x, prec).unwrap()
    }

    #[test]
    fn test_shape_and_trapezoidal_form() {
        let basis = basis_for(128, &[0.5, 1.25, 2.0, 3.5]);
        assert_eq!(basis.y.len(), 4);
        assert_eq!(basis.h.rows(), 4);
        assert_eq!(basis.h.cols(), 3);
        assert!(basis.h.is_lower_trapezoidal());
    }

    #[test]
    fn test_y_is_unit_norm() {
        let prec = 128;
        let basis = basis_for(prec, &[1.0, 2.0, 3.0]);
        let mut norm_sq = Float::with_val(prec, 0);
        for v in &basis.y {
            norm_sq += Float::with_val(prec, v * v);
        }
        let defect = (norm_sq - 1u32).abs();
        assert!(defect < utils::sqrt_epsilon(prec));
    }

    #[test]
    fn test_diagonal_is_positive() {
        let basis = basis_for(128, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        for i in 0..4 {
            assert!(*basis.h.at(i, i) > 0, "diagonal entry {} not positive", i);
        }
    }

    #[test]
    fn test_two_values() {
        let prec = 128;
        let basis = basis_for(prec, &[1.0, 1.5]);
        // H is 2×1: diagonal x₁/‖x‖ over the suffix root, one off-diagonal.
        assert_eq!(basis.h.rows(), 2);
        assert_eq!(basis.h.cols(), 1);
        assert!(*basis.h.at(0, 0) > 0);
        assert!(*basis.h.at(1, 0) < 0);
    }

    #[test]
    fn test_near_duplicates_rejected() {
        let prec = 100;
        let a = Float::with_val(prec, 2).sqrt();
        let mut b = a.clone();
        b.next_up();
        match HBasis::from_values(&[a, b], prec) {
            Err(PslqError::PrecisionInsufficient { detail, .. }) => {
                assert!(detail.contains("ulps"));
            }
            other => panic!("expected PrecisionInsufficient, got {:?}", other),
        }
    }
}
