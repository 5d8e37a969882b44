//! The seam between CDCL and an arithmetic theory: a Boolean variable can stand for a linear
//! constraint, and CDCL asks the theory whether its current assignment to those variables is
//! arithmetically consistent.

use std::collections::BTreeMap;

use crate::error::SolverResult;
use crate::lra::{Constraint, LraResult, Simplex};
use crate::sat::types::{Literal, Var};

/// Outcome of a theory consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryResult {
    Sat,
    /// A subset of the literals handed to `check` that is, by itself, theory-unsatisfiable.
    /// Minimal subsets are preferred but not required.
    Unsat { conflict: Vec<Literal> },
}

/// A theory solver consulted by CDCL whenever a batch of theory-atom literals has been assigned.
pub trait TheorySolver {
    fn check(&self, assignments: &[Literal]) -> SolverResult<TheoryResult>;
}

/// Wraps [`Simplex`] behind the [`TheorySolver`] seam: each Boolean variable in `atoms` denotes a
/// linear constraint when assigned `true`.
///
/// This is not a full DPLL(T) loop: there is no theory-aware decision heuristic and no theory
/// restart. Negated equality atoms (`x != b`) are not representable as a single linear
/// constraint, so a negative literal over an `Eq` atom contributes no information to the check
/// rather than being (unsoundly) dropped as a conflict or (expensively) case-split into a
/// disjunction — composing this into a complete decision procedure is left to the caller.
#[derive(Debug, Clone)]
pub struct LraTheory {
    atoms: BTreeMap<Var, Constraint>,
}

impl LraTheory {
    pub fn new(atoms: BTreeMap<Var, Constraint>) -> Self {
        LraTheory { atoms }
    }
}

impl TheorySolver for LraTheory {
    fn check(&self, assignments: &[Literal]) -> SolverResult<TheoryResult> {
        let mut constraints = Vec::new();
        let mut implicated = Vec::new();

        for &literal in assignments {
            let Some(atom) = self.atoms.get(&literal.var()) else {
                continue;
            };
            let constraint = if literal.is_positive() {
                Some(atom.clone())
            } else {
                atom.negate()
            };
            if let Some(constraint) = constraint {
                constraints.push(constraint);
                implicated.push(literal);
            }
        }

        let mut simplex = Simplex::new(&constraints)?;
        match simplex.solve() {
            LraResult::Sat(_) => Ok(TheoryResult::Sat),
            LraResult::Unsat => Ok(TheoryResult::Unsat { conflict: implicated }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::rational::{Rational, Relation};
    use crate::lra::LinearTerm;

    #[test]
    fn consistent_assignment_is_sat() {
        let mut atoms = BTreeMap::new();
        atoms.insert(0, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Le, Rational::from_int(5)));
        atoms.insert(1, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Ge, Rational::from_int(1)));
        let theory = LraTheory::new(atoms);

        let assignments = [Literal::positive(0), Literal::positive(1)];
        assert_eq!(theory.check(&assignments).unwrap(), TheoryResult::Sat);
    }

    #[test]
    fn contradictory_assignment_is_unsat_with_full_conflict() {
        let mut atoms = BTreeMap::new();
        atoms.insert(0, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Le, Rational::from_int(1)));
        atoms.insert(1, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Ge, Rational::from_int(2)));
        let theory = LraTheory::new(atoms);

        let assignments = [Literal::positive(0), Literal::positive(1)];
        match theory.check(&assignments).unwrap() {
            TheoryResult::Sat => panic!("expected an arithmetic conflict"),
            TheoryResult::Unsat { conflict } => assert_eq!(conflict.len(), 2),
        }
    }

    #[test]
    fn negative_literal_flips_the_atom() {
        let mut atoms = BTreeMap::new();
        // atom: x <= 1; asserting its negation means x > 1.
        atoms.insert(0, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Le, Rational::from_int(1)));
        atoms.insert(1, Constraint::new(LinearTerm::single(0, Rational::one()), Relation::Ge, Rational::from_int(2)));
        let theory = LraTheory::new(atoms);

        // x > 1 (negated atom 0) together with x >= 2 is consistent.
        let assignments = [Literal::negative(0), Literal::positive(1)];
        assert_eq!(theory.check(&assignments).unwrap(), TheoryResult::Sat);
    }
}
