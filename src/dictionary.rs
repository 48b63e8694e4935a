//! Labelled-constant dictionaries and symbolic rendering of relations
//!
//! The solver works on bare numbers; this layer attaches symbols. A
//! dictionary maps high-precision values to display labels, runs the
//! solver over the sorted values, and renders a discovered relation as an
//! equation such as `1·ln(2) + 1·ln(3) - 1·ln(6) = 0`.

use crate::core::error::{PslqError, Result};
use crate::core::types::Relation;
use crate::pslq::PslqSolver;
use rug::float::Constant;
use rug::{Float, Integer};

/// An ordered mapping from positive constants to symbols
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    // Sorted ascending by value; symbols are display-only.
    entries: Vec<(Float, String)>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries have been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a labelled constant. The solver is reflection invariant, so
    /// negative constants belong in the dictionary as their absolute
    /// value with the sign folded into the label (e.g. `-ln(γ)` for a
    /// value known to be negative).
    ///
    /// Returns false, without inserting, for values the solver cannot
    /// accept (non-positive or non-finite) and for exact duplicates.
    pub fn insert(&mut self, value: Float, symbol: impl Into<String>) -> bool {
        let symbol = symbol.into();
        if value.is_zero() || !value.is_finite() || value.is_sign_negative() {
            log::warn!("dictionary entry {:?} skipped: value must be positive", symbol);
            return false;
        }
        let position = self
            .entries
            .partition_point(|(v, _)| *v < value);
        if position < self.entries.len() && self.entries[position].0 == value {
            log::warn!(
                "dictionary entry {:?} skipped: value collides with {:?}",
                symbol,
                self.entries[position].1
            );
            return false;
        }
        self.entries.insert(position, (value, symbol));
        true
    }

    /// Run the relation search over the dictionary values with the
    /// default solver; render a hit as a symbolic equation.
    pub fn find_relation(&self, max_norm: &Float) -> Result<Option<String>> {
        self.find_relation_with(&PslqSolver::new(), max_norm)
    }

    /// Run the relation search with a caller-configured solver
    pub fn find_relation_with(
        &self,
        solver: &PslqSolver,
        max_norm: &Float,
    ) -> Result<Option<String>> {
        let values: Vec<Float> = self.entries.iter().map(|(v, _)| v.clone()).collect();
        match solver.find_relation(&values, max_norm)? {
            Some(relation) => Ok(Some(self.render(&relation)?)),
            None => Ok(None),
        }
    }

    /// Map the relation's values back to symbols and format the equation.
    ///
    /// The solver rounds inputs to the shared working precision, so terms
    /// are matched against the entries in order rather than by bitwise
    /// equality.
    fn render(&self, relation: &Relation) -> Result<String> {
        let mut pieces = String::new();
        let mut entry_iter = self.entries.iter();
        for (i, term) in relation.terms.iter().enumerate() {
            let prec = term.value.prec();
            let symbol = loop {
                let (value, symbol) = entry_iter.next().ok_or_else(|| {
                    PslqError::invariant("relation term does not match any dictionary entry")
                })?;
                if Float::with_val(prec, value) == term.value {
                    break symbol;
                }
            };
            if i == 0 {
                pieces.push_str(&format!("{}·{}", term.coefficient, symbol));
            } else {
                let sign = if term.coefficient < 0 { '-' } else { '+' };
                let abs = Integer::from(term.coefficient.abs_ref());
                pieces.push_str(&format!(" {} {}·{}", sign, abs, symbol));
            }
        }
        Ok(format!(
            "{} = 0 (residual {:.3e})",
            pieces,
            relation.residual.to_f64()
        ))
    }
}

/// A small dictionary for debugging and tests: π, e, √2, ln(2)
pub fn small_dictionary(prec: u32) -> Dictionary {
    let mut d = Dictionary::new();
    d.insert(Float::with_val(prec, Constant::Pi), "π");
    d.insert(Float::with_val(prec, 1).exp(), "e");
    d.insert(Float::with_val(prec, 2).sqrt(), "√2");
    d.insert(Float::with_val(prec, Constant::Log2), "ln(2)");
    d
}

/// The standard search dictionary: common constants, their low powers,
/// square roots of small primes, and logarithms of small primes (the
/// latter recover multiplicative relations).
pub fn standard_dictionary(prec: u32) -> Dictionary {
    let mut d = Dictionary::new();

    let pi = Float::with_val(prec, Constant::Pi);
    d.insert(pi.clone(), "π");
    d.insert(Float::with_val(prec, &pi * &pi), "π²");
    d.insert(Float::with_val(prec, &pi * &pi) * &pi, "π³");
    d.insert(pi.clone().sqrt(), "√π");
    d.insert(pi.clone().recip(), "1/π");
    d.insert(Float::with_val(prec, &pi * &pi).recip(), "1/π²");
    d.insert(pi.clone().ln(), "ln(π)");

    let e = Float::with_val(prec, 1).exp();
    d.insert(e.clone(), "e");
    d.insert(e.clone().sqrt(), "√e");

    let euler = Float::with_val(prec, Constant::Euler);
    d.insert(euler.clone(), "γ");
    d.insert(Float::with_val(prec, &euler * &euler), "γ²");
    d.insert(euler.clone().recip(), "1/γ");
    // γ < 1, so its logarithm enters negated.
    d.insert(-euler.clone().ln(), "-ln(γ)");
    d.insert(euler.clone().exp(), "exp(γ)");

    let catalan = Float::with_val(prec, Constant::Catalan);
    d.insert(catalan.clone(), "G");
    d.insert(Float::with_val(prec, &catalan * &catalan), "G²");
    d.insert(catalan.clone().recip(), "1/G");
    d.insert(catalan.clone().sqrt(), "√G");
    d.insert(catalan.clone().exp(), "exp(G)");

    for p in [2u32, 3, 5, 7, 11] {
        d.insert(
            Float::with_val(prec, p).sqrt(),
            format!("√{}", p),
        );
    }
    for p in [2u32, 3, 5, 7, 11, 13, 17, 19] {
        d.insert(Float::with_val(prec, p).ln(), format!("ln({})", p));
    }

    d
}

/// Try to identify one labelled value against the standard dictionary,
/// augmented with entries derived from the value itself: its reciprocal,
/// its square, and its exponential.
pub fn identify(value: &Float, symbol: &str, max_norm: &Float) -> Result<Option<String>> {
    if value.is_zero() {
        return Err(PslqError::InputHasZero { index: 0 });
    }
    if !value.is_finite() || value.is_sign_negative() {
        return Err(PslqError::InputNonPositive { index: 0 });
    }

    let prec = value.prec();
    let mut dictionary = standard_dictionary(prec);
    dictionary.insert(value.clone(), symbol);
    dictionary.insert(value.clone().recip(), format!("1/{}", symbol));
    dictionary.insert(Float::with_val(prec, value * value), format!("{}²", symbol));
    dictionary.insert(value.clone().exp(), format!("exp({})", symbol));

    dictionary.find_relation(max_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREC: u32 = 256;

    #[test]
    fn test_insert_keeps_sorted_order() {
        let mut d = Dictionary::new();
        assert!(d.insert(Float::with_val(PREC, 3), "three"));
        assert!(d.insert(Float::with_val(PREC, 1), "one"));
        assert!(d.insert(Float::with_val(PREC, 2), "two"));
        assert_eq!(d.len(), 3);
        let values: Vec<f64> = d.entries.iter().map(|(v, _)| v.to_f64()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_insert_rejects_bad_values() {
        let mut d = Dictionary::new();
        assert!(!d.insert(Float::with_val(PREC, 0), "zero"));
        assert!(!d.insert(Float::with_val(PREC, -1), "minus one"));
        assert!(d.insert(Float::with_val(PREC, 2), "two"));
        assert!(!d.insert(Float::with_val(PREC, 2), "two again"));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn test_log_relation_rendered() {
        // ln(2) + ln(3) = ln(6)
        let mut d = Dictionary::new();
        d.insert(Float::with_val(PREC, 2).ln(), "ln(2)");
        d.insert(Float::with_val(PREC, 3).ln(), "ln(3)");
        d.insert(Float::with_val(PREC, 6).ln(), "ln(6)");

        let max_norm = Float::with_val(PREC, 1e10);
        let equation = d
            .find_relation(&max_norm)
            .unwrap()
            .expect("the log relation must be found");
        assert!(equation.contains("ln(2)"));
        assert!(equation.contains("ln(3)"));
        assert!(equation.contains("ln(6)"));
        assert!(equation.contains("= 0"));
        assert!(equation.contains("residual"));
    }

    #[test]
    fn test_small_dictionary_contents() {
        let d = small_dictionary(128);
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn test_standard_dictionary_is_consistent() {
        // Every entry positive, strictly increasing after sorting.
        let d = standard_dictionary(128);
        assert!(d.len() > 20);
        for window in d.entries.windows(2) {
            assert!(window[0].0 < window[1].0);
        }
    }

    #[test]
    fn test_identify_square_root() {
        // x = √2 collides with the dictionary's own √2 entry (skipped),
        // but the derived reciprocal gives √2 − 2·(1/x) = 0.
        let value = Float::with_val(PREC, 2).sqrt();
        let max_norm = Float::with_val(PREC, 1e3);
        let equation = identify(&value, "x", &max_norm)
            .unwrap()
            .expect("√2 and 1/x are related");
        assert!(equation.contains("1/x"));
        assert!(equation.contains("√2"));
    }

    #[test]
    fn test_identify_rejects_non_positive() {
        let max_norm = Float::with_val(PREC, 1e6);
        let zero = Float::with_val(PREC, 0);
        assert!(matches!(
            identify(&zero, "z", &max_norm),
            Err(PslqError::InputHasZero { .. })
        ));
        let neg = Float::with_val(PREC, -3);
        assert!(matches!(
            identify(&neg, "n", &max_norm),
            Err(PslqError::InputNonPositive { .. })
        ));
    }
}
