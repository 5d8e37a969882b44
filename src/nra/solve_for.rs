//! `solve_for`: isolates one variable in a linear(ized) constraint and computes the interval set
//! of values consistent with the rest of the constraint under the current domains.

use std::collections::BTreeMap;

use crate::kernel::polynomial::Polynomial;
use crate::kernel::rational::{Relation, Rational};
use crate::nra::interval::{kth_root, ExtReal, Interval, IntervalUnion};
use crate::nra::preprocess::eval_monomial;
use crate::sat::types::Var;

/// The result of solving a constraint for one of its variables: the candidate value set, and the
/// relation as it applies after accounting for a sign flip from dividing by a negative
/// coefficient (dividing `x <= 5` by `-2` yields `x >= -2.5`, not `x <= -2.5`).
#[derive(Debug, Clone, PartialEq)]
pub struct SolveForResult {
    pub candidates: IntervalUnion,
    pub relation: Relation,
}

/// Solves `poly relation bound` for `var`. Returns `None` if `var` does not appear in `poly`.
pub fn solve_for(
    poly: &Polynomial,
    relation: Relation,
    bound: Rational,
    var: Var,
    domains: &BTreeMap<Var, IntervalUnion>,
) -> Option<SolveForResult> {
    let mut rest = Interval::point(ExtReal::finite(0.0));
    let mut var_term = None;

    for (monomial, coefficient) in poly.terms() {
        if monomial.exponent(var) > 0 {
            // preprocessing never leaves more than one monomial mentioning a given variable
            // within the same constraint (linear terms carry one variable each; a side
            // constraint isolates a single non-linear monomial), so the first hit is the term.
            var_term = Some((coefficient, monomial.exponent(var), monomial.clone()));
        } else {
            rest = rest.add(&eval_monomial(coefficient, monomial, domains));
        }
    }

    let (coefficient, exponent, monomial) = var_term?;

    let mut effective_coefficient = Interval::point(ExtReal::from_rational(coefficient));
    for (other_var, other_exponent) in monomial.iter() {
        if other_var == var {
            continue;
        }
        let other_hull = domains.get(&other_var).map(IntervalUnion::hull).unwrap_or_else(Interval::unbounded);
        for _ in 0..other_exponent {
            effective_coefficient = effective_coefficient.mul(&other_hull);
        }
    }

    let rhs = Interval::point(ExtReal::from_rational(bound)).sub(&rest);
    let strict = relation.strictness().is_strict();

    if effective_coefficient.straddles_zero() {
        let candidates = if strict { IntervalUnion::empty() } else { IntervalUnion::single(Interval::unbounded()) };
        return Some(SolveForResult { candidates, relation });
    }

    let quotient = match rhs.div(&effective_coefficient) {
        Some(q) => q,
        None => Interval::unbounded(),
    };

    let effective_relation =
        if effective_coefficient.hi() < ExtReal::finite(0.0) { relation.flip() } else { relation };

    let candidates = kth_root(&quotient, exponent);
    Some(SolveForResult { candidates, relation: effective_relation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::polynomial::{mk_polynomial, Monomial, Term};

    fn v(i: usize) -> Var {
        i
    }

    fn iv(lo: f64, hi: f64) -> Interval {
        Interval::new(ExtReal::finite(lo), ExtReal::finite(hi))
    }

    #[test]
    fn linear_solve_divides_and_flips_on_negative_coefficient() {
        // -2x <= 6  =>  x >= -3
        let poly = mk_polynomial(vec![Term { coefficient: Rational::from_int(-2), monomial: Monomial::single(v(0), 1) }]).unwrap();
        let result = solve_for(&poly, Relation::Le, Rational::from_int(6), v(0), &BTreeMap::new()).unwrap();
        assert_eq!(result.relation, Relation::Ge);
        assert_eq!(result.candidates.hull(), iv(-3.0, -3.0));
    }

    #[test]
    fn absent_variable_returns_none() {
        let poly = mk_polynomial(vec![Term { coefficient: Rational::one(), monomial: Monomial::single(v(0), 1) }]).unwrap();
        assert!(solve_for(&poly, Relation::Le, Rational::zero(), v(1), &BTreeMap::new()).is_none());
    }

    #[test]
    fn quadratic_equality_yields_two_root_components() {
        // h = x^2, h fixed to [4, 4] by domain, solving for x should yield {-2} U {2}.
        let poly = mk_polynomial(vec![
            Term { coefficient: Rational::one(), monomial: Monomial::single(v(1), 1) },
            Term { coefficient: Rational::from_int(-1), monomial: Monomial::single(v(0), 2) },
        ])
        .unwrap();
        let mut domains = BTreeMap::new();
        domains.insert(v(1), IntervalUnion::single(iv(4.0, 4.0)));

        let result = solve_for(&poly, Relation::Eq, Rational::zero(), v(0), &domains).unwrap();
        assert_eq!(result.candidates.components().len(), 2);
    }
}
