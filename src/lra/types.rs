//! Shared linear-arithmetic data types: linear terms, constraints and bounds.

use std::collections::BTreeMap;

use crate::kernel::rational::{Rational, Relation, Strictness};
use crate::sat::types::Var;

/// A mapping variable -> non-zero rational coefficient.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinearTerm {
    coefficients: BTreeMap<Var, Rational>,
}

impl LinearTerm {
    pub fn zero() -> Self {
        LinearTerm::default()
    }

    pub fn single(var: Var, coefficient: Rational) -> Self {
        let mut term = LinearTerm::zero();
        term.set(var, coefficient);
        term
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Var, Rational)>) -> Self {
        let mut term = LinearTerm::zero();
        for (var, coeff) in pairs {
            term.add_in_place(var, coeff);
        }
        term
    }

    /// Sets the coefficient of `var`, removing the entry entirely if it becomes zero.
    fn set(&mut self, var: Var, coefficient: Rational) {
        if coefficient.is_zero() {
            let _ = self.coefficients.remove(&var);
        } else {
            let _ = self.coefficients.insert(var, coefficient);
        }
    }

    pub fn add_in_place(&mut self, var: Var, delta: Rational) {
        let current = self.coefficients.get(&var).copied().unwrap_or(Rational::zero());
        self.set(var, current + delta);
    }

    pub fn coefficient(&self, var: Var) -> Rational {
        self.coefficients.get(&var).copied().unwrap_or(Rational::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.coefficients.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Var, Rational)> + '_ {
        self.coefficients.iter().map(|(&v, &c)| (v, c))
    }

    /// Evaluates the term under a total assignment of every variable it mentions.
    pub fn eval(&self, assignment: &BTreeMap<Var, Rational>) -> Rational {
        self.coefficients.iter().fold(Rational::zero(), |acc, (v, &c)| {
            acc + c * assignment.get(v).copied().unwrap_or(Rational::zero())
        })
    }

    pub fn scale(&self, factor: Rational) -> LinearTerm {
        if factor.is_zero() {
            return LinearTerm::zero();
        }
        LinearTerm {
            coefficients: self.coefficients.iter().map(|(&v, &c)| (v, c * factor)).collect(),
        }
    }

    pub fn add(&self, other: &LinearTerm) -> LinearTerm {
        let mut result = self.clone();
        for (var, coeff) in other.iter() {
            result.add_in_place(var, coeff);
        }
        result
    }

    pub fn sub(&self, other: &LinearTerm) -> LinearTerm {
        self.add(&other.scale(-Rational::one()))
    }
}

/// A constraint `(linear term) relation bound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub term: LinearTerm,
    pub relation: Relation,
    pub bound: Rational,
}

impl Constraint {
    pub fn new(term: LinearTerm, relation: Relation, bound: Rational) -> Self {
        Constraint { term, relation, bound }
    }

    pub fn is_satisfied(&self, assignment: &BTreeMap<Var, Rational>) -> bool {
        let value = self.term.eval(assignment);
        match self.relation {
            Relation::Le => value <= self.bound,
            Relation::Lt => value < self.bound,
            Relation::Eq => value == self.bound,
            Relation::Ge => value >= self.bound,
            Relation::Gt => value > self.bound,
        }
    }

    /// The logical negation of this constraint, or `None` for `Eq`: `x != b` is a disjunction of
    /// two inequalities, not a single linear constraint, so it has no representation here. Callers
    /// that need to assert a negated equality atom (theory interoperation) are expected to treat
    /// that case separately rather than call this method on it.
    pub fn negate(&self) -> Option<Constraint> {
        let relation = match self.relation {
            Relation::Le => Relation::Gt,
            Relation::Lt => Relation::Ge,
            Relation::Ge => Relation::Lt,
            Relation::Gt => Relation::Le,
            Relation::Eq => return None,
        };
        Some(Constraint::new(self.term.clone(), relation, self.bound))
    }
}

/// One of a variable's upper/lower bounds, carrying strictness alongside the rational value so
/// that `x < 5` compares as strictly tighter than `x <= 5` at the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub value: Rational,
    pub strictness: Strictness,
}

impl Bound {
    pub fn non_strict(value: Rational) -> Self {
        Bound { value, strictness: Strictness::NonStrict }
    }

    pub fn strict(value: Rational) -> Self {
        Bound { value, strictness: Strictness::Strict }
    }

    /// True iff `value` violates this bound when used as an upper bound.
    pub fn violated_as_upper(&self, value: DeltaRational) -> bool {
        let threshold = DeltaRational::from_rational(self.value);
        match self.strictness {
            Strictness::NonStrict => value > threshold,
            Strictness::Strict => value >= threshold,
        }
    }

    /// True iff `value` violates this bound when used as a lower bound.
    pub fn violated_as_lower(&self, value: DeltaRational) -> bool {
        let threshold = DeltaRational::from_rational(self.value);
        match self.strictness {
            Strictness::NonStrict => value < threshold,
            Strictness::Strict => value <= threshold,
        }
    }
}

/// `base + delta * epsilon` for a fixed, implicit infinitesimal `epsilon > 0`.
///
/// A bounded-variable Simplex tableau needs to pivot a variable to a value that is strictly past
/// a strict bound, not merely equal to it — there is no such plain rational for `x < 5` (any
/// rational we pick is either `< 5`, and so not the tightest, or `>= 5`, and so infeasible).
/// `DeltaRational` represents "the bound, nudged by an infinitesimal" exactly: ordering compares
/// `base` first and `delta` only to break ties, which is exactly how `base + delta * epsilon`
/// compares for any `epsilon` small enough to not close the gap between distinct bases. Only the
/// final step back into a concrete model (see `Simplex::resolve_model`) has to commit to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeltaRational {
    base: Rational,
    delta: Rational,
}

impl DeltaRational {
    pub fn from_rational(base: Rational) -> Self {
        DeltaRational { base, delta: Rational::zero() }
    }

    /// The least `DeltaRational` that still compares strictly greater than `base`.
    pub fn just_above(base: Rational) -> Self {
        DeltaRational { base, delta: Rational::one() }
    }

    /// The greatest `DeltaRational` that still compares strictly less than `base`.
    pub fn just_below(base: Rational) -> Self {
        DeltaRational { base, delta: -Rational::one() }
    }

    pub fn base(&self) -> Rational {
        self.base
    }

    pub fn delta(&self) -> Rational {
        self.delta
    }

    pub fn scale(&self, factor: Rational) -> Self {
        DeltaRational { base: self.base * factor, delta: self.delta * factor }
    }

    pub fn add(&self, other: &Self) -> Self {
        DeltaRational { base: self.base + other.base, delta: self.delta + other.delta }
    }

    pub fn sub(&self, other: &Self) -> Self {
        DeltaRational { base: self.base - other.base, delta: self.delta - other.delta }
    }

    /// True for a value with no infinitesimal offset whose base is a whole number. A non-zero
    /// `delta` means this value is only ever the limit of a concrete rational, never one itself,
    /// so it is never considered integral.
    pub fn is_integer(&self) -> bool {
        self.delta.is_zero() && self.base.is_integer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_term_combines_and_drops_zero_coefficients() {
        let mut term = LinearTerm::zero();
        term.add_in_place(0, Rational::from_int(2));
        term.add_in_place(0, Rational::from_int(-2));
        assert!(term.is_zero());
    }

    #[test]
    fn eval_matches_hand_computation() {
        let term = LinearTerm::from_pairs([(0, Rational::from_int(2)), (1, Rational::from_int(3))]);
        let mut assignment = BTreeMap::new();
        assignment.insert(0, Rational::from_int(5));
        assignment.insert(1, Rational::from_int(1));
        assert_eq!(term.eval(&assignment), Rational::from_int(13));
    }

    #[test]
    fn negate_flips_relation_and_rejects_equality() {
        let term = LinearTerm::single(0, Rational::one());
        let le = Constraint::new(term.clone(), Relation::Le, Rational::from_int(5));
        assert_eq!(le.negate().unwrap().relation, Relation::Gt);
        assert!(Constraint::new(term, Relation::Eq, Rational::from_int(5)).negate().is_none());
    }

    #[test]
    fn bound_violation_strictness() {
        let five = DeltaRational::from_rational(Rational::from_int(5));
        let upper = Bound::strict(Rational::from_int(5));
        assert!(upper.violated_as_upper(five));
        assert!(!Bound::non_strict(Rational::from_int(5)).violated_as_upper(five));
    }

    #[test]
    fn delta_rational_orders_base_before_delta() {
        let base = Rational::from_int(5);
        assert!(DeltaRational::just_below(base) < DeltaRational::from_rational(base));
        assert!(DeltaRational::from_rational(base) < DeltaRational::just_above(base));
        assert!(DeltaRational::from_rational(Rational::from_int(4)) < DeltaRational::just_above(base));
    }
}
