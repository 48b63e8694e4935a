//! Unimodular bookkeeping pair (A, B) with A·B = I
//!
//! Every row operation applied to the geometric state is mirrored here so
//! that the columns of B always express the running relation candidates in
//! terms of the original input vector. Entries are `rug::Integer`, so the
//! ledger cannot overflow however long the run goes.

use crate::core::error::{PslqError, Result};
use rug::Integer;

/// The integer matrices A (row transform) and B = A⁻¹ (column transform)
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLedger {
    a: Vec<Vec<Integer>>,
    b: Vec<Vec<Integer>>,
    n: usize,
}

impl IntegerLedger {
    /// Create the identity ledger of dimension n
    pub fn identity(n: usize) -> Result<Self> {
        if n < 2 {
            return Err(PslqError::invariant(
                "ledger dimension must be at least 2",
            ));
        }
        let mut a = vec![vec![Integer::from(0); n]; n];
        let mut b = a.clone();
        for i in 0..n {
            a[i][i] = Integer::from(1);
            b[i][i] = Integer::from(1);
        }
        Ok(IntegerLedger { a, b, n })
    }

    /// Dimension n of both matrices
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Apply the size-reduction step for scalar t:
    /// A[i,·] ← A[i,·] − t·A[j,·] and B[·,j] ← B[·,j] + t·B[·,i].
    ///
    /// Both updates use the same t, which keeps A·B = I exactly.
    pub fn reduce_row(&mut self, i: usize, j: usize, t: &Integer) {
        debug_assert_ne!(i, j);
        for k in 0..self.n {
            let delta = Integer::from(t * &self.a[j][k]);
            self.a[i][k] -= delta;
            let delta = Integer::from(t * &self.b[k][i]);
            self.b[k][j] += delta;
        }
    }

    /// Exchange rows m and m+1 of A together with columns m and m+1 of B
    pub fn swap_rows(&mut self, m: usize) {
        debug_assert!(m + 1 < self.n);
        self.a.swap(m, m + 1);
        for row in &mut self.b {
            row.swap(m, m + 1);
        }
    }

    /// Column j of B: the candidate relation exposed when yⱼ vanishes
    pub fn relation_column(&self, j: usize) -> Vec<Integer> {
        self.b.iter().map(|row| row[j].clone()).collect()
    }

    /// Entry of A (used by invariant checks and tests)
    pub fn a_entry(&self, i: usize, j: usize) -> &Integer {
        &self.a[i][j]
    }

    /// Entry of B (used by invariant checks and tests)
    pub fn b_entry(&self, i: usize, j: usize) -> &Integer {
        &self.b[i][j]
    }

    /// Exact check that A·B = I still holds
    pub fn product_is_identity(&self) -> bool {
        for i in 0..self.n {
            for j in 0..self.n {
                let mut acc = Integer::from(0);
                for k in 0..self.n {
                    acc += Integer::from(&self.a[i][k] * &self.b[k][j]);
                }
                let expected = i32::from(i == j);
                if acc != expected {
                    return false;
                }
            }
        }
        true
    }
}
