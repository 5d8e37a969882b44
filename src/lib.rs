//! The decision core: a CDCL SAT engine, a Simplex-based linear real/integer arithmetic engine
//! (with Gomory cuts and branch-and-bound), and an interval-constraint-propagation engine for
//! non-linear real arithmetic, plus a small seam wiring an arithmetic theory into CDCL.
//!
//! Every subsystem is single-threaded and synchronous: no operation suspends, there is no I/O on
//! the decision path, and the only mutable state is local to a single call.

pub mod asserts;
pub mod error;
pub mod kernel;
pub mod lra;
pub mod nra;
pub mod sat;
pub mod theory;
