//! Integer relation detection with the PSLQ algorithm
//!
//! Given high-precision reals x₁ < x₂ < … < xₙ, this crate searches for a
//! non-zero integer vector r with Σ rᵢ·xᵢ ≈ 0, or certifies that no such
//! relation with Euclidean norm below a caller-chosen bound exists. The
//! arithmetic runs on `rug` (MPFR/GMP): `Float` for the geometric state
//! and `Integer` for the exact bookkeeping matrices.
//!
//! # Examples
//!
//! Recovering ln(2) + ln(3) = ln(6):
//! ```rust
//! use relation_solver::pslq;
//! use rug::Float;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let prec = 256;
//! let x = vec![
//!     Float::with_val(prec, 2).ln(),
//!     Float::with_val(prec, 3).ln(),
//!     Float::with_val(prec, 6).ln(),
//! ];
//! let max_norm = Float::with_val(prec, 1e10);
//! let relation = pslq(&x, &max_norm)?.expect("the log relation exists");
//! println!("{}", relation);
//! # Ok(())
//! # }
//! ```
//!
//! Symbolic search through a dictionary:
//! ```rust
//! use relation_solver::Dictionary;
//! use rug::Float;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let prec = 256;
//! let mut dictionary = Dictionary::new();
//! dictionary.insert(Float::with_val(prec, 2).ln(), "ln(2)");
//! dictionary.insert(Float::with_val(prec, 3).ln(), "ln(3)");
//! dictionary.insert(Float::with_val(prec, 6).ln(), "ln(6)");
//!
//! let max_norm = Float::with_val(prec, 1e10);
//! if let Some(equation) = dictionary.find_relation(&max_norm)? {
//!     println!("{}", equation);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod dictionary;
pub mod guard;
pub mod hmatrix;
pub mod pslq;
pub mod reducer;
pub mod utils;

pub use self::core::error::{PslqError, Result};
pub use self::core::ledger::IntegerLedger;
pub use self::core::matrix::RealMatrix;
pub use self::core::types::{
    PslqParams, Relation, RelationTerm, Warning, DEFAULT_GAMMA, GAMMA_FLOOR,
};
pub use self::dictionary::{identify, small_dictionary, standard_dictionary, Dictionary};
pub use self::pslq::{pslq, pslq_with_gamma, PslqSolver, PslqState, RoundOutcome};
pub use self::utils::expected_iterations;
