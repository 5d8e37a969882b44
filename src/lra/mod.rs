//! Linear real/rational and linear integer arithmetic: bounded Simplex, Fourier-Motzkin as a
//! reference oracle, Gomory cuts, and branch-and-bound.

pub mod branch_and_bound;
pub mod cuts;
pub mod fourier_motzkin;
pub mod simplex;
pub mod types;

pub use branch_and_bound::BnbResult;
pub use fourier_motzkin::{fourier_motzkin_unsat, Fm};
pub use simplex::{LraResult, Simplex};
pub use types::{Bound, Constraint, LinearTerm};
