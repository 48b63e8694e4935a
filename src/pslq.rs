//! The PSLQ iteration and its public entry points
//!
//! One round follows Bailey's formulation
//! (https://www.davidhbailey.com/dhbpapers/pslq-cse.pdf): select the pivot
//! m maximising γ^(i+1)·|Hᵢᵢ|, exchange rows m and m+1 of (y, H, A) and
//! columns of B, erase the corner that the exchange creates on the H
//! diagonal with a Givens rotation, then re-reduce the rows below the
//! pivot. A relation surfaces when an entry of y falls below ε^(15/16);
//! the matching column of B is the integer relation. When no entry
//! vanishes, 1/maxᵢ|Hᵢᵢ| certifies that every undetected relation has
//! Euclidean norm at least that large.

use crate::core::error::{PslqError, Result};
use crate::core::ledger::IntegerLedger;
use crate::core::matrix::RealMatrix;
use crate::core::types::{PslqParams, Relation, RelationTerm, Warning};
use crate::guard;
use crate::hmatrix::HBasis;
use crate::reducer;
use crate::utils;
use rug::Float;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a single PSLQ round
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    /// No entry of y vanished; the iteration continues
    Continue,
    /// A relation was certified this round
    Relation(Relation),
}

/// Full mutable state of one PSLQ invocation.
///
/// Exposed so that callers with their own driving loop (progress
/// reporting, custom budgets) can step the iteration round by round; most
/// callers want [`PslqSolver::find_relation`] instead.
#[derive(Debug, Clone)]
pub struct PslqState {
    x: Vec<Float>,
    y: Vec<Float>,
    h: RealMatrix,
    ledger: IntegerLedger,
    gamma: Float,
    prec: u32,
    zero_threshold: Float,
    norm_bound: Float,
    best_norm_bound: Float,
    warnings: Vec<Warning>,
}

impl PslqState {
    /// Validate the input, build (y, H), and run the initial full
    /// reduction so the state is ready for its first round.
    pub fn initialize(x: &[Float], max_norm: &Float, params: &PslqParams) -> Result<Self> {
        let checked = guard::validate(x, max_norm, params)?;
        let prec = checked.prec;
        log::debug!(
            "working precision {} bits, τ = {:.6}",
            prec,
            checked.tau.to_f64()
        );

        // Bring every input to the shared working precision.
        let x: Vec<Float> = x.iter().map(|v| Float::with_val(prec, v)).collect();

        let HBasis { mut y, mut h } = HBasis::from_values(&x, prec)?;
        let mut ledger = IntegerLedger::identity(x.len())?;
        reducer::reduce_full(&mut h, &mut y, &mut ledger)?;

        let norm_bound = Self::bound_from(&h)?;
        let zero_threshold =
            utils::zero_threshold(prec, params.zero_exponent.0, params.zero_exponent.1);

        Ok(PslqState {
            x,
            y,
            h,
            ledger,
            gamma: Float::with_val(prec, params.gamma),
            prec,
            zero_threshold,
            best_norm_bound: norm_bound.clone(),
            norm_bound,
            warnings: Vec::new(),
        })
    }

    /// Certified lower bound on the norm of any undetected relation
    pub fn norm_bound(&self) -> &Float {
        &self.norm_bound
    }

    /// Non-fatal diagnostics collected so far
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// One PSLQ round. The cancellation flag, when given, is honoured
    /// between pivot selection and the exchange.
    pub fn round(&mut self, cancel: Option<&AtomicBool>) -> Result<RoundOutcome> {
        let m = self.select_pivot()?;

        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                return Err(PslqError::Cancelled);
            }
        }

        let n = self.h.rows();
        self.y.swap(m, m + 1);
        self.h.swap_rows(m, m + 1);
        self.ledger.swap_rows(m);

        // The exchange puts weight at (m, m+1) only when another diagonal
        // entry follows; for m = n−2 the swap leaves H trapezoidal as is.
        if m < n - 2 {
            self.remove_corner(m)?;
        }

        reducer::reduce_partial(&mut self.h, &mut self.y, &mut self.ledger, m)?;

        if let Some(relation) = self.extract_relation()? {
            return Ok(RoundOutcome::Relation(relation));
        }

        self.update_norm_bound()?;
        Ok(RoundOutcome::Continue)
    }

    /// Scan y for an entry below the zero threshold and, if found, read
    /// the relation out of the matching column of B.
    pub fn extract_relation(&self) -> Result<Option<Relation>> {
        for i in 0..self.y.len() {
            if self.y[i].clone().abs() < self.zero_threshold {
                return Ok(Some(self.relation_at(i)?));
            }
        }
        Ok(None)
    }

    /// Pivot row m maximising γ^(i+1)·|Hᵢᵢ|; ties take the lowest index.
    /// Only diagonal positions 0..n−1 are candidates, so m = n−1 cannot
    /// occur.
    fn select_pivot(&self) -> Result<usize> {
        let n = self.h.rows();
        let mut weight = self.gamma.clone();
        let mut best: Option<(usize, Float)> = None;
        for i in 0..n - 1 {
            let term = self.h.at(i, i).clone().abs() * &weight;
            let replace = match &best {
                Some((_, max)) => term > *max,
                None => true,
            };
            if replace {
                best = Some((i, term));
            }
            weight *= &self.gamma;
        }
        match best {
            Some((m, _)) => Ok(m),
            None => Err(PslqError::invariant("pivot selection found no candidate")),
        }
    }

    /// Givens rotation on columns m and m+1, applied from row m down,
    /// erasing the corner the exchange created and restoring trapezoidal
    /// form. Neither yᵀH nor ‖H‖_F changes.
    fn remove_corner(&mut self, m: usize) -> Result<()> {
        let prec = self.prec;
        let n = self.h.rows();

        let mut t0 = Float::with_val(prec, self.h.at(m, m) * self.h.at(m, m));
        t0 += Float::with_val(prec, self.h.at(m, m + 1) * self.h.at(m, m + 1));
        let t0 = t0.sqrt();
        if t0.is_zero() {
            return Err(PslqError::invariant(format!(
                "corner magnitude vanished at pivot {}",
                m
            )));
        }
        let t1 = Float::with_val(prec, self.h.at(m, m) / &t0);
        let t2 = Float::with_val(prec, self.h.at(m, m + 1) / &t0);

        for i in m..n {
            let t3 = self.h.at(i, m).clone();
            let t4 = self.h.at(i, m + 1).clone();
            let mut left = Float::with_val(prec, &t1 * &t3);
            left += Float::with_val(prec, &t2 * &t4);
            let mut right = Float::with_val(prec, &t1 * &t4);
            right -= Float::with_val(prec, &t2 * &t3);
            self.h.set(i, m, left);
            self.h.set(i, m + 1, right);
        }
        // The rotation annihilates the (m, m+1) entry by construction;
        // store the exact zero rather than its round-off residue.
        self.h.set(m, m + 1, Float::with_val(prec, 0));
        Ok(())
    }

    fn relation_at(&self, index: usize) -> Result<Relation> {
        let prec = self.prec;
        let column = self.ledger.relation_column(index);

        let mut residual = Float::with_val(prec, 0);
        let mut magnitude = Float::with_val(prec, 0);
        for (coeff, value) in column.iter().zip(&self.x) {
            let term = Float::with_val(prec, value * coeff);
            residual += &term;
            magnitude += term.abs();
        }

        let mut warnings = self.warnings.clone();
        let mut tolerance = Float::with_val(prec, utils::epsilon(prec) * &magnitude);
        tolerance *= 16u32;
        if residual.clone().abs() > tolerance {
            log::warn!(
                "relation found with residual {:.3e} above the tolerable {:.3e}; \
                 the inputs likely do not carry their full declared precision",
                residual.to_f64(),
                tolerance.to_f64()
            );
            warnings.push(Warning::LargeResidual);
        }

        let terms: Vec<RelationTerm> = column
            .into_iter()
            .zip(self.x.iter())
            .filter(|(coeff, _)| *coeff != 0)
            .map(|(coeff, value)| RelationTerm {
                coefficient: coeff,
                value: value.clone(),
            })
            .collect();

        Ok(Relation {
            terms,
            residual,
            warnings,
        })
    }

    /// Recompute the certified bound. The exact iteration never lowers
    /// it; a small numerical regression is warned about, a collapse below
    /// half the best bound so far is treated as a bug.
    fn update_norm_bound(&mut self) -> Result<()> {
        let bound = Self::bound_from(&self.h)?;
        if bound < self.norm_bound {
            log::warn!(
                "certified norm bound decreased from {:.6e} to {:.6e}",
                self.norm_bound.to_f64(),
                bound.to_f64()
            );
            if !self.warnings.contains(&Warning::NormBoundDecreased) {
                self.warnings.push(Warning::NormBoundDecreased);
            }
            let floor = Float::with_val(self.prec, &self.best_norm_bound / 2u32);
            if bound < floor {
                return Err(PslqError::invariant(
                    "certified norm bound fell below half its peak value",
                ));
            }
        }
        if bound > self.best_norm_bound {
            self.best_norm_bound = bound.clone();
        }
        self.norm_bound = bound;
        Ok(())
    }

    fn bound_from(h: &RealMatrix) -> Result<Float> {
        let max = h.max_abs_diagonal();
        if max.is_zero() {
            return Err(PslqError::invariant("the H diagonal vanished entirely"));
        }
        Ok(Float::with_val(h.prec(), 1) / max)
    }
}

/// Integer relation solver: the public face of the iteration
#[derive(Debug, Clone, Default)]
pub struct PslqSolver {
    params: PslqParams,
    cancel: Option<Arc<AtomicBool>>,
}

impl PslqSolver {
    /// Create a solver with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom parameters
    pub fn with_params(params: PslqParams) -> Self {
        PslqSolver {
            params,
            cancel: None,
        }
    }

    /// Install a cancellation flag, checked once per round
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Solver parameters
    pub fn params(&self) -> &PslqParams {
        &self.params
    }

    /// Search for an integer relation among `x` with Euclidean norm below
    /// `max_norm`.
    ///
    /// Returns `Ok(Some(relation))` for the first relation the
    /// termination test certifies, `Ok(None)` once the certified bound
    /// shows no relation below `max_norm` exists, and `Err` for invalid
    /// input or a mid-run failure. `x` must be strictly increasing and
    /// positive; the run executes at the smallest precision among the
    /// inputs.
    pub fn find_relation(&self, x: &[Float], max_norm: &Float) -> Result<Option<Relation>> {
        let mut state = PslqState::initialize(x, max_norm, &self.params)?;

        let budget = utils::expected_iterations(
            x.len(),
            max_norm,
            self.params.gamma,
            self.params.tau(),
        );
        let cap = budget.saturating_mul(self.params.budget_slack);
        log::info!(
            "pslq: n = {}, {} bits, expected at most {} rounds",
            x.len(),
            state.prec,
            budget
        );

        let cancel = self.cancel.as_deref();
        let mut iteration: u64 = 0;
        while state.norm_bound() < max_norm {
            match state.round(cancel)? {
                RoundOutcome::Relation(relation) => {
                    log::info!(
                        "relation of {} terms found after {} rounds, residual {:.3e}",
                        relation.len(),
                        iteration + 1,
                        relation.residual.to_f64()
                    );
                    return Ok(Some(relation));
                }
                RoundOutcome::Continue => {}
            }
            iteration += 1;
            if iteration % 64 == 0 {
                log::debug!(
                    "round {}/{}: norm bound {:.6e} of {:.6e}",
                    iteration,
                    budget,
                    state.norm_bound().to_f64(),
                    max_norm.to_f64()
                );
            }
            if iteration > cap {
                return Err(PslqError::invariant(format!(
                    "no termination after {} rounds, {}× the expected budget",
                    iteration, self.params.budget_slack
                )));
            }
        }

        log::info!(
            "no relation with norm below {:.6e} exists among the inputs",
            max_norm.to_f64()
        );
        Ok(None)
    }
}

/// Search for an integer relation using the default γ = 2/√3 + 0.01
pub fn pslq(x: &[Float], max_norm: &Float) -> Result<Option<Relation>> {
    PslqSolver::new().find_relation(x, max_norm)
}

/// Search for an integer relation with an explicit γ
pub fn pslq_with_gamma(x: &[Float], max_norm: &Float, gamma: f64) -> Result<Option<Relation>> {
    PslqSolver::with_params(PslqParams::with_gamma(gamma)).find_relation(x, max_norm)
}
