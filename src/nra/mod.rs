//! Non-linear real arithmetic: interval constraint propagation over polynomial constraints.
//!
//! Non-linear monomials are linearized against fresh auxiliary variables before propagation runs,
//! so the core contraction step only ever solves a constraint for one variable at a time.

pub mod candidates;
pub mod contraction;
pub mod icp;
pub mod interval;
pub mod preprocess;
pub mod solve_for;

pub use candidates::{Candidate, CandidateStore};
pub use contraction::contract;
pub use icp::{solve, IcpResult, DEFAULT_MAX_ITERATIONS};
pub use interval::{ExtReal, Interval, IntervalUnion};
pub use preprocess::PolyConstraint;
pub use solve_for::{solve_for, SolveForResult};
