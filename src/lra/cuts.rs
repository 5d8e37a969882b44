//! Gomory cutting planes.
//!
//! A cutting-plane round tightens the continuous relaxation without branching: whenever a basic
//! variable flagged integral carries a fractional value, its row yields a cut that is satisfied
//! by every integer-feasible point of the current system but violated by the current (fractional)
//! vertex, so re-entering Simplex with the cut added strictly reduces the feasible region.

use std::collections::BTreeSet;

use log::debug;

use crate::error::SolverResult;
use crate::lra::simplex::{LraResult, Simplex};
use crate::lra::types::Constraint;
use crate::sat::types::Var;

/// Result of a bounded run of cutting-plane rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutOutcome {
    Unsat,
    /// The (possibly enlarged) constraint list after cutting, with the relaxed model it produced.
    /// Some flagged-integer variables may still be fractional — the caller (branch-and-bound)
    /// is responsible for branching on those.
    Tightened { constraints: Vec<Constraint> },
}

/// Runs up to `max_rounds` rounds of Gomory cut generation against basic variables in
/// `integer_vars`. Stops early once a round adds no cut (no basic integer variable is
/// fractional) since further rounds would be no-ops.
pub fn tighten_with_cuts(
    constraints: &[Constraint],
    integer_vars: &BTreeSet<Var>,
    max_rounds: usize,
) -> SolverResult<CutOutcome> {
    let mut current: Vec<Constraint> = constraints.to_vec();

    for round in 0..max_rounds {
        let mut simplex = Simplex::new(&current)?;
        match simplex.solve() {
            LraResult::Unsat => return Ok(CutOutcome::Unsat),
            LraResult::Sat(_) => {
                let cut_var = simplex
                    .fractional_basic_vars()
                    .into_iter()
                    .find(|v| integer_vars.contains(v));

                let Some(var) = cut_var else {
                    debug!("cutting-plane round {round}: no fractional basic integer variable, stopping");
                    break;
                };

                let Some(cut) = simplex.gomory_cut(var) else {
                    break;
                };
                debug!("cutting-plane round {round}: adding cut on variable {var}");
                current.push(cut);
            }
        }
    }

    Ok(CutOutcome::Tightened { constraints: current })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::rational::{Rational, Relation};
    use crate::lra::simplex::Simplex;
    use crate::lra::types::LinearTerm;

    #[test]
    fn cut_is_satisfied_by_every_integer_point_of_the_system() {
        // 2x <= 3, 2x >= 1  =>  x in [0.5, 1.5], relaxation picks a fractional vertex for x.
        let x = LinearTerm::single(0, Rational::from_int(2));
        let constraints = vec![
            Constraint::new(x.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(x, Relation::Ge, Rational::from_int(1)),
        ];
        let mut integer_vars = BTreeSet::new();
        integer_vars.insert(0);

        match tighten_with_cuts(&constraints, &integer_vars, 5).unwrap() {
            CutOutcome::Unsat => panic!("expected a tightened system"),
            CutOutcome::Tightened { constraints: augmented } => {
                // the integer-feasible point x = 1 must still satisfy every added cut.
                let mut point = std::collections::BTreeMap::new();
                point.insert(0, Rational::one());
                for c in &augmented {
                    assert!(c.is_satisfied(&point), "cut {c:?} excludes the integer solution x=1");
                }

                let mut simplex = Simplex::new(&augmented).unwrap();
                assert!(matches!(simplex.solve(), LraResult::Sat(_)), "augmented system still SAT");
            }
        }
    }
}
