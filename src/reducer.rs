//! Hermite size reduction of H with lockstep y and ledger updates
//!
//! After a pass, |Hᵢⱼ| ≤ ½|Hⱼⱼ| for every j < i, which is what lets γ
//! control the convergence rate. The reduction scalar t is computed once
//! from H, rounded half away from zero, converted once to an integer, and
//! that single integer drives the H update, the y update, and the ledger
//! update. Recomputing t separately on the real and integer sides would
//! let round-off break A·B = I.

use crate::core::error::{PslqError, Result};
use crate::core::ledger::IntegerLedger;
use crate::core::matrix::RealMatrix;
use rug::Float;

/// Full reduction sweep: every row against every earlier diagonal.
/// Used once, right after H is constructed.
pub fn reduce_full(
    h: &mut RealMatrix,
    y: &mut [Float],
    ledger: &mut IntegerLedger,
) -> Result<()> {
    let n = h.rows();
    for i in 1..n {
        for j in (0..i.min(n - 1)).rev() {
            reduce_entry(h, y, ledger, i, j)?;
        }
    }
    Ok(())
}

/// Partial sweep after a swap at pivot m: only rows below m and columns
/// up to m+1 can have lost the size bound.
pub fn reduce_partial(
    h: &mut RealMatrix,
    y: &mut [Float],
    ledger: &mut IntegerLedger,
    m: usize,
) -> Result<()> {
    let n = h.rows();
    for i in (m + 1)..n {
        let top = (i - 1).min(m + 1);
        for j in (0..=top).rev() {
            reduce_entry(h, y, ledger, i, j)?;
        }
    }
    Ok(())
}

/// One size-reduction step: t = round(Hᵢⱼ/Hⱼⱼ), then
/// H[i,·] ← H[i,·] − t·H[j,·] (columns 0..=j), yⱼ ← yⱼ + t·yᵢ,
/// and the matching ledger row operation.
fn reduce_entry(
    h: &mut RealMatrix,
    y: &mut [Float],
    ledger: &mut IntegerLedger,
    i: usize,
    j: usize,
) -> Result<()> {
    let prec = h.prec();
    let ratio = Float::with_val(prec, h.at(i, j) / h.at(j, j));
    let rounded = ratio.round();
    if rounded.is_zero() {
        return Ok(());
    }
    let t = rounded.to_integer().ok_or_else(|| {
        PslqError::integer_overflow(
            "reduction scalar is not finite; the H diagonal has collapsed",
        )
    })?;
    let t_real = Float::with_val(prec, &t);

    let delta = Float::with_val(prec, &t_real * &y[i]);
    y[j] += delta;

    for k in 0..=j {
        let delta = Float::with_val(prec, &t_real * h.at(j, k));
        *h.at_mut(i, k) -= delta;
    }

    ledger.reduce_row(i, j, &t);
    Ok(())
}
