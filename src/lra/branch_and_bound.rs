//! Branch-and-bound for integer variables: depth-first search over `x <= floor(v)` /
//! `x >= ceil(v)` subproblems, each first tightened by a round of Gomory cuts.

use std::collections::BTreeSet;

use log::debug;

use crate::error::SolverResult;
use crate::kernel::rational::{Rational, Relation};
use crate::lra::cuts::{tighten_with_cuts, CutOutcome};
use crate::lra::simplex::{LraResult, Simplex};
use crate::lra::types::{Constraint, LinearTerm};
use crate::sat::types::Var;

/// A round of cut generation attempted at every branch-and-bound node before branching.
const CUT_ROUNDS_PER_NODE: usize = 3;

/// The outcome of a bounded branch-and-bound search.
///
/// Termination on unbounded integer domains is not guaranteed in general, so `solve` takes an
/// explicit node budget (`max_nodes`). Exhausting the budget returns `Unknown` rather than
/// `Unsat` — distinct from both `Sat` and `Unsat`, since a budget-limited search that finds no
/// integer point has proved nothing about the problem's actual satisfiability. This is the one
/// place in the decision core where a search returns something other than SAT/UNSAT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BnbResult {
    Sat(std::collections::BTreeMap<Var, Rational>),
    Unsat,
    Unknown,
}

/// Solves `constraints` for a model that also assigns every variable in `integer_vars` an
/// integer value, exploring at most `max_nodes` subproblems.
pub fn solve(
    constraints: &[Constraint],
    integer_vars: &BTreeSet<Var>,
    max_nodes: usize,
) -> SolverResult<BnbResult> {
    let mut nodes_explored = 0usize;
    solve_node(constraints, integer_vars, max_nodes, &mut nodes_explored)
}

fn solve_node(
    constraints: &[Constraint],
    integer_vars: &BTreeSet<Var>,
    max_nodes: usize,
    nodes_explored: &mut usize,
) -> SolverResult<BnbResult> {
    if *nodes_explored >= max_nodes {
        debug!("branch-and-bound: node budget ({max_nodes}) exhausted");
        return Ok(BnbResult::Unknown);
    }
    *nodes_explored += 1;

    let tightened = match tighten_with_cuts(constraints, integer_vars, CUT_ROUNDS_PER_NODE)? {
        CutOutcome::Unsat => return Ok(BnbResult::Unsat),
        CutOutcome::Tightened { constraints } => constraints,
    };

    let mut simplex = Simplex::new(&tightened)?;
    let model = match simplex.solve() {
        LraResult::Unsat => return Ok(BnbResult::Unsat),
        LraResult::Sat(model) => model,
    };

    let fractional_var = integer_vars.iter().copied().find(|v| {
        !model.get(v).copied().unwrap_or(Rational::zero()).is_integer()
    });

    let Some(var) = fractional_var else {
        return Ok(BnbResult::Sat(model));
    };
    let value = model[&var];
    debug!("branch-and-bound: branching on variable {var} with fractional value {value}");

    let var_term = LinearTerm::single(var, Rational::one());

    let mut floor_branch = tightened.clone();
    floor_branch.push(Constraint::new(var_term.clone(), Relation::Le, Rational::from_int(value.floor())));
    match solve_node(&floor_branch, integer_vars, max_nodes, nodes_explored)? {
        BnbResult::Sat(model) => return Ok(BnbResult::Sat(model)),
        BnbResult::Unknown => return Ok(BnbResult::Unknown),
        BnbResult::Unsat => {}
    }

    let mut ceil_branch = tightened;
    ceil_branch.push(Constraint::new(var_term, Relation::Ge, Rational::from_int(value.ceil())));
    solve_node(&ceil_branch, integer_vars, max_nodes, nodes_explored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lia_example_finds_x_equals_one() {
        let x = LinearTerm::single(0, Rational::from_int(2));
        let constraints = vec![
            Constraint::new(x.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(x, Relation::Ge, Rational::from_int(1)),
        ];
        let mut integer_vars = BTreeSet::new();
        integer_vars.insert(0);

        match solve(&constraints, &integer_vars, 100).unwrap() {
            BnbResult::Sat(model) => assert_eq!(model[&0], Rational::one()),
            other => panic!("expected SAT, got {other:?}"),
        }
    }

    #[test]
    fn infeasible_bounds_are_unsat() {
        let x = LinearTerm::single(0, Rational::one());
        let constraints = vec![
            Constraint::new(x.clone(), Relation::Le, Rational::from_int(1)),
            Constraint::new(x, Relation::Ge, Rational::from_int(2)),
        ];
        let mut integer_vars = BTreeSet::new();
        integer_vars.insert(0);
        assert_eq!(solve(&constraints, &integer_vars, 100).unwrap(), BnbResult::Unsat);
    }

    #[test]
    fn zero_node_budget_yields_unknown() {
        let x = LinearTerm::single(0, Rational::from_int(2));
        let constraints = vec![
            Constraint::new(x.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(x, Relation::Ge, Rational::from_int(1)),
        ];
        let mut integer_vars = BTreeSet::new();
        integer_vars.insert(0);
        assert_eq!(solve(&constraints, &integer_vars, 0).unwrap(), BnbResult::Unknown);
    }
}
