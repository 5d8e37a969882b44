//! The interval constraint propagation loop: repeatedly pick a candidate, contract its variable's
//! domain, reweight, and stop after a bounded number of iterations or once any domain empties.

use std::collections::BTreeMap;

use log::debug;

use crate::nra::candidates::{relative_contraction, Candidate, CandidateStore};
use crate::nra::contraction::contract;
use crate::nra::interval::IntervalUnion;
use crate::nra::preprocess::{PolyConstraint, PreprocessState};
use crate::nra::solve_for::solve_for;
use crate::sat::types::Var;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Outcome of running the interval-propagation engine to completion or until a domain emptied.
#[derive(Debug, Clone, PartialEq)]
pub enum IcpResult {
    /// The (possibly narrower) domain map; every original variable plus any auxiliary ones
    /// introduced by linearization.
    Refined(BTreeMap<Var, IntervalUnion>),
    Unsat,
}

/// Runs preprocessing followed by up to `max_iterations` contraction steps over `constraints`,
/// starting from `domains`.
pub fn solve(
    constraints: &[PolyConstraint],
    domains: BTreeMap<Var, IntervalUnion>,
    max_iterations: usize,
) -> IcpResult {
    let next_var = constraints
        .iter()
        .flat_map(|c| c.poly.variables())
        .chain(domains.keys().copied())
        .max()
        .map_or(0, |m| m + 1);

    let mut state = PreprocessState::new(next_var, domains);
    let linearized: Vec<PolyConstraint> = constraints.iter().map(|c| state.linearize_constraint(c)).collect();
    let (side_constraints, mut domains) = state.into_parts();

    let mut all_constraints = linearized;
    all_constraints.extend(side_constraints);

    let mut candidates = CandidateStore::new(build_candidates(&all_constraints));

    for iteration in 0..max_iterations {
        let Some(candidate) = candidates.choose_contraction_candidate() else {
            debug!("ICP: no contraction candidates remain at iteration {iteration}, stopping early");
            break;
        };

        let constraint = &all_constraints[candidate.constraint_index];
        let Some(result) = solve_for(&constraint.poly, constraint.relation, constraint.bound, candidate.var, &domains) else {
            continue;
        };

        let current = domains.entry(candidate.var).or_insert_with(IntervalUnion::empty);
        let old_diameter = current.diameter();
        let narrowed = contract(&result.candidates, result.relation, current);
        let new_diameter = narrowed.diameter();
        *current = narrowed;

        if current.is_empty() {
            debug!("ICP: domain for variable {} emptied at iteration {iteration}", candidate.var);
            return IcpResult::Unsat;
        }

        let weight = relative_contraction(old_diameter, new_diameter);
        candidates.reinsert(candidate, weight);
    }

    IcpResult::Refined(domains)
}

fn build_candidates(constraints: &[PolyConstraint]) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (index, constraint) in constraints.iter().enumerate() {
        for var in constraint.poly.variables() {
            candidates.push(Candidate { constraint_index: index, var });
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::polynomial::{mk_polynomial, Monomial, Term};
    use crate::kernel::rational::{Rational, Relation};
    use crate::nra::interval::{ExtReal, Interval};

    fn v(i: usize) -> Var {
        i
    }

    fn iv(lo: f64, hi: f64) -> IntervalUnion {
        IntervalUnion::single(Interval::new(ExtReal::finite(lo), ExtReal::finite(hi)))
    }

    #[test]
    fn product_of_squares_equal_zero_keeps_zero_in_domain() {
        // x^2 * y^2 = 0, x,y in [-1,1]
        let xy2 = Monomial::from_exponents([(v(0), 2), (v(1), 2)]);
        let poly = mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: xy2 }]).unwrap();
        let constraint = PolyConstraint::new(poly, Relation::Eq, Rational::zero());

        let mut domains = BTreeMap::new();
        domains.insert(v(0), iv(-1.0, 1.0));
        domains.insert(v(1), iv(-1.0, 1.0));

        match solve(&[constraint], domains, DEFAULT_MAX_ITERATIONS) {
            IcpResult::Unsat => panic!("expected a refined (non-empty) domain map"),
            IcpResult::Refined(domains) => {
                assert!(domains[&v(0)].hull().contains(ExtReal::finite(0.0)));
                assert!(domains[&v(1)].hull().contains(ExtReal::finite(0.0)));
            }
        }
    }

    #[test]
    fn contradictory_linear_box_is_unsat() {
        let x = Monomial::single(v(0), 1);
        let le = PolyConstraint::new(
            mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: x.clone() }]).unwrap(),
            Relation::Le,
            Rational::from_int(1),
        );
        let ge = PolyConstraint::new(
            mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: x }]).unwrap(),
            Relation::Ge,
            Rational::from_int(5),
        );

        let mut domains = BTreeMap::new();
        domains.insert(v(0), iv(-10.0, 10.0));

        assert_eq!(solve(&[le, ge], domains, DEFAULT_MAX_ITERATIONS), IcpResult::Unsat);
    }
}
