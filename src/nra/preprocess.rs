//! Linearization: replaces every non-linear monomial with a fresh auxiliary variable and a side
//! constraint tying it back to the monomial it replaces, so the rest of the ICP engine only ever
//! has to solve linear(ized) constraints for a single variable.

use std::collections::BTreeMap;

use crate::kernel::polynomial::{mk_polynomial, Monomial, Polynomial, Term};
use crate::kernel::rational::{Rational, Relation};
use crate::nra::interval::{ExtReal, Interval, IntervalUnion};
use crate::sat::types::Var;

/// A polynomial constraint `poly relation bound`, the NRA analogue of [`crate::lra::Constraint`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolyConstraint {
    pub poly: Polynomial,
    pub relation: Relation,
    pub bound: Rational,
}

impl PolyConstraint {
    pub fn new(poly: Polynomial, relation: Relation, bound: Rational) -> Self {
        PolyConstraint { poly, relation, bound }
    }
}

/// Interval-evaluates `coefficient * monomial` under `domains`, taking the convex hull of each
/// mentioned variable's domain. This is a sound over-approximation even when a variable's domain
/// is a disjoint union — later contraction rounds narrow it further, so starting from the hull
/// costs precision, not soundness.
pub(crate) fn eval_monomial(
    coefficient: Rational,
    monomial: &Monomial,
    domains: &BTreeMap<Var, IntervalUnion>,
) -> Interval {
    let mut acc = Interval::point(ExtReal::from_rational(coefficient));
    for (var, exponent) in monomial.iter() {
        let var_hull = domains.get(&var).map(IntervalUnion::hull).unwrap_or_else(Interval::unbounded);
        for _ in 0..exponent {
            acc = acc.mul(&var_hull);
        }
    }
    acc
}

/// Threads the three pieces of state a preprocessing pass needs: the next fresh variable id, the
/// side constraints emitted so far, and the (growing) domain map.
pub struct PreprocessState {
    next_var: Var,
    side_constraints: Vec<PolyConstraint>,
    domains: BTreeMap<Var, IntervalUnion>,
}

impl PreprocessState {
    pub fn new(next_var: Var, domains: BTreeMap<Var, IntervalUnion>) -> Self {
        PreprocessState { next_var, side_constraints: Vec::new(), domains }
    }

    fn fresh_var(&mut self) -> Var {
        let v = self.next_var;
        self.next_var += 1;
        v
    }

    pub fn into_parts(self) -> (Vec<PolyConstraint>, BTreeMap<Var, IntervalUnion>) {
        (self.side_constraints, self.domains)
    }

    fn linearize(&mut self, poly: &Polynomial) -> Polynomial {
        let mut linear_terms = Vec::new();
        for (monomial, coefficient) in poly.terms() {
            if monomial.degree() <= 1 {
                linear_terms.push(Term { coefficient, monomial: monomial.clone() });
                continue;
            }

            let h = self.fresh_var();
            let h_domain = eval_monomial(coefficient, monomial, &self.domains);
            self.domains.insert(h, IntervalUnion::single(h_domain));

            let side = mk_polynomial(vec![
                Term { coefficient: Rational::one(), monomial: Monomial::single(h, 1) },
                Term { coefficient: -coefficient, monomial: monomial.clone() },
            ])
            .expect("h is fresh so it cannot coincide with the monomial it replaces");
            self.side_constraints.push(PolyConstraint::new(side, Relation::Eq, Rational::zero()));

            linear_terms.push(Term { coefficient: Rational::one(), monomial: Monomial::single(h, 1) });
        }

        if linear_terms.is_empty() {
            Polynomial::zero()
        } else {
            mk_polynomial(linear_terms).expect("built from at least one term above")
        }
    }

    /// Linearizes a single constraint, recording any side constraints and domains it needs as a
    /// side effect on `self`.
    pub fn linearize_constraint(&mut self, constraint: &PolyConstraint) -> PolyConstraint {
        let poly = self.linearize(&constraint.poly);
        PolyConstraint::new(poly, constraint.relation, constraint.bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: usize) -> Var {
        i
    }

    #[test]
    fn linear_constraint_passes_through_unchanged() {
        let poly = mk_polynomial(vec![Term { coefficient: Rational::from_int(2), monomial: Monomial::single(v(0), 1) }]).unwrap();
        let constraint = PolyConstraint::new(poly.clone(), Relation::Le, Rational::from_int(5));

        let mut state = PreprocessState::new(1, BTreeMap::new());
        let linearized = state.linearize_constraint(&constraint);

        assert_eq!(linearized.poly, poly);
        let (side, _) = state.into_parts();
        assert!(side.is_empty());
    }

    #[test]
    fn quadratic_term_introduces_fresh_variable_and_side_constraint() {
        // x^2 <= 4, x in [-1, 1]
        let x2 = Monomial::single(v(0), 2);
        let poly = mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: x2 }]).unwrap();
        let constraint = PolyConstraint::new(poly, Relation::Le, Rational::from_int(4));

        let mut domains = BTreeMap::new();
        domains.insert(v(0), IntervalUnion::single(Interval::new(ExtReal::finite(-1.0), ExtReal::finite(1.0))));

        let mut state = PreprocessState::new(1, domains);
        let linearized = state.linearize_constraint(&constraint);
        assert_eq!(linearized.poly.degree(), 1);

        let (side, domains) = state.into_parts();
        assert_eq!(side.len(), 1);
        assert!(domains.contains_key(&1));
    }
}
