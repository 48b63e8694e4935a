//! Core error types for integer relation detection

use rug::Float;

/// Error types for PSLQ runs
#[derive(Debug, Clone)]
pub enum PslqError {
    /// Input values are not sorted in strictly increasing order
    InputNotSorted {
        index: usize,
    },

    /// Input contains a negative (or non-finite) value
    InputNonPositive {
        index: usize,
    },

    /// Input contains a zero value
    InputHasZero {
        index: usize,
    },

    /// Fewer than two input values
    InputTooShort(usize),

    /// γ does not satisfy γ > 2/√3
    GammaOutOfRange(f64),

    /// Derived τ = 1/√(¼ + 1/γ²) does not lie in (1, 2)
    TauOutOfRange(f64),

    /// The requested norm bound cannot be certified at the working
    /// precision; carries the largest bound that can
    PrecisionInsufficient {
        detail: String,
        max_norm_bound: Option<Float>,
    },

    /// A rounded reduction scalar could not be converted to an integer
    IntegerOverflow(String),

    /// An algebraic invariant failed mid-run; indicates a bug, not bad input
    InternalInvariantViolated(String),

    /// The run was cancelled through the caller's cancellation flag
    Cancelled,
}

impl std::fmt::Display for PslqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PslqError::InputNotSorted { index } => {
                write!(
                    f,
                    "input values must be sorted in strictly increasing order (violated at index {})",
                    index
                )
            }
            PslqError::InputNonPositive { index } => {
                write!(
                    f,
                    "the algorithm is reflection invariant; input values must be positive \
                     (violated at index {})",
                    index
                )
            }
            PslqError::InputHasZero { index } => {
                write!(
                    f,
                    "a zero input gives a trivial relation (found at index {})",
                    index
                )
            }
            PslqError::InputTooShort(found) => {
                write!(
                    f,
                    "at least two values are required to find an integer relation, got {}",
                    found
                )
            }
            PslqError::GammaOutOfRange(gamma) => {
                write!(f, "γ > 2/√3 is required, got {}", gamma)
            }
            PslqError::TauOutOfRange(tau) => {
                write!(f, "τ ∈ (1, 2) is required, derived τ = {}", tau)
            }
            PslqError::PrecisionInsufficient {
                detail,
                max_norm_bound,
            } => {
                write!(f, "insufficient precision: {}", detail)?;
                if let Some(bound) = max_norm_bound {
                    write!(
                        f,
                        "; at this precision the norm bound cannot exceed {}",
                        bound
                    )?;
                }
                Ok(())
            }
            PslqError::IntegerOverflow(msg) => {
                write!(f, "integer overflow: {}", msg)
            }
            PslqError::InternalInvariantViolated(msg) => {
                write!(f, "internal invariant violated (this is a bug): {}", msg)
            }
            PslqError::Cancelled => {
                write!(f, "cancelled by caller")
            }
        }
    }
}

impl std::error::Error for PslqError {}

/// Result type for PSLQ operations
pub type Result<T> = std::result::Result<T, PslqError>;

impl PslqError {
    /// Create a precision error with no recommended bound attached
    pub fn precision_insufficient(detail: impl Into<String>) -> Self {
        PslqError::PrecisionInsufficient {
            detail: detail.into(),
            max_norm_bound: None,
        }
    }

    /// Create a precision error carrying the largest certifiable norm bound
    pub fn precision_insufficient_with_bound(detail: impl Into<String>, bound: Float) -> Self {
        PslqError::PrecisionInsufficient {
            detail: detail.into(),
            max_norm_bound: Some(bound),
        }
    }

    /// Create an integer overflow error
    pub fn integer_overflow(msg: impl Into<String>) -> Self {
        PslqError::IntegerOverflow(msg.into())
    }

    /// Create an internal invariant error
    pub fn invariant(msg: impl Into<String>) -> Self {
        PslqError::InternalInvariantViolated(msg.into())
    }
}
