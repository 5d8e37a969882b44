//! The closed error taxonomy for the decision core.
//!
//! Domain-level negative answers — UNSAT, an empty interval, the empty clause — are ordinary
//! variants of each subsystem's result enum, never a [`SolverError`]. This type exists only for
//! the three kinds of programmer error the original design calls out: malformed input reaching a
//! smart constructor, a relation Simplex cannot represent, and an internal invariant violation.

use thiserror::Error;

/// Programmer-facing errors raised by the kernel, LRA, and NRA subsystems.
///
/// The SAT engine raises none of these: every CNF, however degenerate (including the empty
/// formula and the formula containing the empty clause), is well-formed input to `sat`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// Malformed input reached a smart constructor, e.g. an empty polynomial was supplied where a
    /// non-empty one is required, or a monomial exponent of zero bypassed [`mk_monomial`].
    ///
    /// [`mk_monomial`]: crate::kernel::polynomial::mk_monomial
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A constraint relation reached a code path that cannot represent it.
    #[error("unsupported relation: {0}")]
    UnsupportedRelation(String),

    /// An internal invariant was violated; this always indicates a bug in the solver rather than
    /// a problem with caller-supplied input.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type SolverResult<T> = Result<T, SolverError>;
