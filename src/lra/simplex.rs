//! Dantzig-style Simplex over rationals with per-variable bounds, using Bland's rule for
//! anti-cycling pivot selection.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use crate::error::{SolverError, SolverResult};
use crate::kernel::rational::{Rational, Relation};
use crate::lra::types::{Bound, Constraint, DeltaRational, LinearTerm};
use crate::sat::types::Var;

/// Evaluates `term` under a `DeltaRational`-valued assignment, the way `LinearTerm::eval`
/// evaluates one under a plain rational assignment. Kept local to this module: nothing outside
/// the tableau ever has a `DeltaRational` in hand.
fn eval_delta(term: &LinearTerm, assignment: &BTreeMap<Var, DeltaRational>) -> DeltaRational {
    term.iter().fold(DeltaRational::from_rational(Rational::zero()), |acc, (v, c)| {
        let value = assignment.get(&v).copied().unwrap_or_else(|| DeltaRational::from_rational(Rational::zero()));
        acc.add(&value.scale(c))
    })
}

/// The outcome of solving a constraint system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LraResult {
    /// An assignment of every original (non-slack) variable that satisfies every constraint.
    Sat(BTreeMap<Var, Rational>),
    Unsat,
}

#[derive(Debug, Clone, Default)]
struct Bounds {
    upper: Option<Bound>,
    lower: Option<Bound>,
}

impl Bounds {
    fn satisfies_upper(&self, value: DeltaRational) -> bool {
        self.upper.map_or(true, |b| !b.violated_as_upper(value))
    }

    fn satisfies_lower(&self, value: DeltaRational) -> bool {
        self.lower.map_or(true, |b| !b.violated_as_lower(value))
    }

    fn is_satisfied(&self, value: DeltaRational) -> bool {
        self.satisfies_upper(value) && self.satisfies_lower(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Violation {
    MustIncrease,
    MustDecrease,
}

/// A Simplex tableau: basic rows, per-variable bounds, and the current assignment.
#[derive(Debug, Clone)]
pub struct Simplex {
    basis: BTreeMap<Var, LinearTerm>,
    bounds: BTreeMap<Var, Bounds>,
    assignment: BTreeMap<Var, DeltaRational>,
    non_basic: BTreeSet<Var>,
    original_vars: BTreeSet<Var>,
    /// Each slack's row as originally recorded, before any pivoting — always purely in terms of
    /// original (non-slack) variables, since slacks don't exist yet when it is captured. Used to
    /// translate a cut or conflict expressed over the live tableau's basis back into original
    /// variable space.
    slack_definitions: BTreeMap<Var, LinearTerm>,
    next_var: Var,
}

impl Simplex {
    /// Builds the initial tableau from a constraint list, introducing one fresh slack variable
    /// per constraint. Returns `Err` only for a relation this encoding cannot represent (none,
    /// today — all five relations are supported directly, see the crate's notes on strict
    /// relations in bounded Simplex).
    pub fn new(constraints: &[Constraint]) -> SolverResult<Simplex> {
        let original_vars: BTreeSet<Var> =
            constraints.iter().flat_map(|c| c.term.variables()).collect();
        let mut next_var = original_vars.iter().next_back().map_or(0, |&v| v + 1);

        let mut basis = BTreeMap::new();
        let mut bounds = BTreeMap::new();
        let mut assignment: BTreeMap<Var, DeltaRational> = original_vars
            .iter()
            .map(|&v| (v, DeltaRational::from_rational(Rational::zero())))
            .collect();

        for constraint in constraints {
            let slack = next_var;
            next_var += 1;

            let slack_bounds = match constraint.relation {
                Relation::Le => Bounds { upper: Some(Bound::non_strict(constraint.bound)), lower: None },
                Relation::Lt => Bounds { upper: Some(Bound::strict(constraint.bound)), lower: None },
                Relation::Ge => Bounds { upper: None, lower: Some(Bound::non_strict(constraint.bound)) },
                Relation::Gt => Bounds { upper: None, lower: Some(Bound::strict(constraint.bound)) },
                Relation::Eq => Bounds {
                    upper: Some(Bound::non_strict(constraint.bound)),
                    lower: Some(Bound::non_strict(constraint.bound)),
                },
            };

            assignment.insert(slack, eval_delta(&constraint.term, &assignment));
            basis.insert(slack, constraint.term.clone());
            bounds.insert(slack, slack_bounds);
        }

        let slack_definitions = basis.clone();
        let non_basic = original_vars.clone();

        let mut simplex = Simplex {
            basis,
            bounds,
            assignment,
            non_basic,
            original_vars,
            slack_definitions,
            next_var,
        };
        simplex.eliminate_zero_rows()?;
        Ok(simplex)
    }

    /// Drops rows whose linear term is identically zero, first checking the constant constraint
    /// they encode for an immediate contradiction.
    fn eliminate_zero_rows(&mut self) -> SolverResult<()> {
        let zero_rows: Vec<Var> = self
            .basis
            .iter()
            .filter(|(_, term)| term.is_zero())
            .map(|(&var, _)| var)
            .collect();

        for slack in zero_rows {
            let value = DeltaRational::from_rational(Rational::zero());
            let bounds = self.bounds.get(&slack).ok_or_else(|| {
                SolverError::Invariant(format!("zero row {slack} has no recorded bounds"))
            })?;
            if !bounds.is_satisfied(value) {
                return Err(SolverError::Invariant(format!(
                    "constant constraint on slack {slack} is immediately violated"
                )));
            }
            self.basis.remove(&slack);
            self.bounds.remove(&slack);
            self.assignment.remove(&slack);
        }
        Ok(())
    }

    fn violation_of(&self, var: Var) -> Option<Violation> {
        let bounds = self.bounds.get(&var)?;
        let value = self.assignment[&var];
        if bounds.lower.is_some_and(|b| b.violated_as_lower(value)) {
            Some(Violation::MustIncrease)
        } else if bounds.upper.is_some_and(|b| b.violated_as_upper(value)) {
            Some(Violation::MustDecrease)
        } else {
            None
        }
    }

    fn first_violated_basic(&self) -> Option<(Var, Violation)> {
        self.basis.keys().find_map(|&var| self.violation_of(var).map(|v| (var, v)))
    }

    fn is_eligible_entering(&self, var: Var, coefficient: Rational, violation: Violation) -> bool {
        let default = Bounds::default();
        let bounds = self.bounds.get(&var).unwrap_or(&default);
        if bounds.upper.is_none() && bounds.lower.is_none() {
            return true;
        }
        let value = self.assignment[&var];
        match violation {
            Violation::MustDecrease => {
                (coefficient.is_positive() && bounds.satisfies_upper(value))
                    || (coefficient.is_negative() && bounds.satisfies_lower(value))
            }
            Violation::MustIncrease => {
                (coefficient.is_negative() && bounds.satisfies_upper(value))
                    || (coefficient.is_positive() && bounds.satisfies_lower(value))
            }
        }
    }

    fn find_entering(&self, row: &LinearTerm, violation: Violation) -> Option<Var> {
        self.non_basic.iter().copied().find(|&n| {
            let c = row.coefficient(n);
            !c.is_zero() && self.is_eligible_entering(n, c, violation)
        })
    }

    /// Pivots `entering` into the basis in place of `leaving`, whose row is `row` and whose
    /// target bound value is `target`.
    fn pivot(&mut self, leaving: Var, entering: Var, row: LinearTerm, target: DeltaRational) {
        let c = row.coefficient(entering);
        let delta_leaving = target.sub(&self.assignment[&leaving]);
        let delta_entering = delta_leaving.scale(c.recip().expect("entering coefficient is non-zero"));

        let inv_c = Rational::one() / c;
        let mut entering_row = row.scale(-inv_c);
        entering_row.add_in_place(leaving, inv_c);
        // `row` still has `entering`'s own coefficient in it; remove the self-reference that
        // `scale(-inv_c)` would otherwise leave behind (coefficient -1 on `entering`).
        entering_row.add_in_place(entering, Rational::one());

        for (basic_var, basic_row) in self.basis.iter_mut() {
            if *basic_var == leaving {
                continue;
            }
            let c_k = basic_row.coefficient(entering);
            if c_k.is_zero() {
                continue;
            }
            *basic_row = basic_row.sub(&LinearTerm::single(entering, c_k)).add(&entering_row.scale(c_k));
        }

        self.basis.remove(&leaving);
        self.basis.insert(entering, entering_row);
        self.non_basic.remove(&entering);
        self.non_basic.insert(leaving);

        self.assignment.insert(entering, self.assignment[&entering].add(&delta_entering));
        self.assignment.insert(leaving, target);

        for (&basic_var, basic_row) in &self.basis {
            let value = eval_delta(basic_row, &self.assignment);
            self.assignment.insert(basic_var, value);
        }

        crate::solver_assert_moderate!(
            self.basis.keys().all(|v| !self.non_basic.contains(v)),
            "a variable cannot be both basic and non-basic after a pivot"
        );
    }

    /// Runs the pivot loop to completion. Takes `&mut self` rather than consuming the tableau so
    /// that, on `Sat`, callers needing integrality (Gomory cuts, branch-and-bound) can still
    /// inspect which basic variable holds a fractional value.
    pub fn solve(&mut self) -> LraResult {
        loop {
            let Some((leaving, violation)) = self.first_violated_basic() else {
                let model = self.resolve_model();
                debug!("simplex SAT, model={model:?}");
                return LraResult::Sat(model);
            };

            let row = self.basis[&leaving].clone();
            trace!("violated basic {leaving} ({violation:?}), row={row:?}");

            let Some(entering) = self.find_entering(&row, violation) else {
                debug!("no entering variable for violated basic {leaving}: UNSAT");
                return LraResult::Unsat;
            };

            let bound = match violation {
                Violation::MustIncrease => {
                    self.bounds[&leaving].lower.expect("MustIncrease implies a violated lower bound")
                }
                Violation::MustDecrease => {
                    self.bounds[&leaving].upper.expect("MustDecrease implies a violated upper bound")
                }
            };
            let target = match (violation, bound.strictness.is_strict()) {
                (_, false) => DeltaRational::from_rational(bound.value),
                (Violation::MustIncrease, true) => DeltaRational::just_above(bound.value),
                (Violation::MustDecrease, true) => DeltaRational::just_below(bound.value),
            };

            trace!("pivoting {entering} in for {leaving}, target={target:?}");
            self.pivot(leaving, entering, row, target);
        }
    }

    /// Collapses the tableau's `DeltaRational` assignment into a concrete rational model.
    ///
    /// Every assignment is `base + delta * epsilon` for the same implicit infinitesimal
    /// `epsilon`; committing to one lets every strict bound the tableau satisfied symbolically
    /// stay satisfied concretely. Any `epsilon` smaller than half the narrowest gap between two
    /// distinct bases in play works, since that gap is what every base-level comparison in the
    /// tableau actually turned on — `delta` only ever broke ties between equal bases.
    fn resolve_model(&self) -> BTreeMap<Var, Rational> {
        let values: Vec<DeltaRational> = self.assignment.values().copied().collect();
        let mut bases: Vec<Rational> = values.iter().map(DeltaRational::base).collect();
        bases.sort();
        bases.dedup();
        let min_gap = bases.windows(2).map(|w| w[1] - w[0]).min();
        let max_delta = values.iter().map(|v| v.delta().abs()).max().unwrap_or(Rational::zero());

        let epsilon = match (min_gap, max_delta.is_zero()) {
            (_, true) => Rational::zero(),
            (Some(gap), false) => gap / (Rational::from_int(4) * max_delta),
            (None, false) => Rational::new(1, 2),
        };

        self.original_vars
            .iter()
            .map(|&v| {
                let value = self.assignment.get(&v).copied().unwrap_or_else(|| DeltaRational::from_rational(Rational::zero()));
                (v, value.base() + value.delta() * epsilon)
            })
            .collect()
    }

    /// Solves a constraint list end-to-end.
    pub fn check(constraints: &[Constraint]) -> SolverResult<LraResult> {
        let mut simplex = Simplex::new(constraints)?;
        Ok(simplex.solve())
    }

    pub(crate) fn next_var(&self) -> Var {
        self.next_var
    }

    /// Basic variables with a non-integer current value, in ascending id order. Only meaningful
    /// to call right after `solve` returned `LraResult::Sat`.
    pub(crate) fn fractional_basic_vars(&self) -> Vec<Var> {
        self.basis
            .keys()
            .copied()
            .filter(|&v| !self.assignment[&v].is_integer())
            .collect()
    }

    /// The real part of `var`'s current assignment, ignoring any infinitesimal offset from a
    /// strict bound it may be pinned to.
    pub(crate) fn assignment_of(&self, var: Var) -> Rational {
        self.assignment.get(&var).map_or(Rational::zero(), DeltaRational::base)
    }

    /// Translates a row expressed over the live basis (a mix of original and slack variables)
    /// back into original-variable space by substituting each slack with the term it was
    /// originally defined to equal. A slack's definition never itself mentions another slack, so
    /// one substitution pass suffices.
    fn expand_to_original(&self, term: &LinearTerm) -> LinearTerm {
        let mut result = LinearTerm::zero();
        for (var, coeff) in term.iter() {
            match self.slack_definitions.get(&var) {
                Some(definition) => result = result.add(&definition.scale(coeff)),
                None => result.add_in_place(var, coeff),
            }
        }
        result
    }

    /// Constructs the Gomory fractional cut for basic variable `var`, whose row is
    /// `var = sum(c_j * n_j)`: `sum(frac(c_j) * n_j) >= frac(value)`, expanded back into original
    /// variables so it can be handed to a fresh `Simplex::new` without its slack ids colliding
    /// with the next tableau's own. Sound for every integer feasible point of the current system.
    pub(crate) fn gomory_cut(&self, var: Var) -> Option<Constraint> {
        let value = self.assignment.get(&var)?.base();
        if value.is_integer() {
            return None;
        }
        let row = self.basis.get(&var)?;
        let mut cut_term = LinearTerm::zero();
        for (nvar, coeff) in row.iter() {
            let frac_coeff = coeff.fract();
            if !frac_coeff.is_zero() {
                cut_term.add_in_place(nvar, frac_coeff);
            }
        }
        let cut_term = self.expand_to_original(&cut_term);
        if cut_term.is_zero() {
            return None;
        }
        Some(Constraint::new(cut_term, Relation::Ge, value.fract()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lra::types::LinearTerm;

    fn x() -> LinearTerm {
        LinearTerm::single(0, Rational::one())
    }

    #[test]
    fn simple_box_is_sat() {
        let xy = LinearTerm::single(0, Rational::one()).add(&LinearTerm::single(1, Rational::one()));
        let x_minus_y =
            LinearTerm::single(0, Rational::one()).add(&LinearTerm::single(1, -Rational::one()));
        let constraints = vec![
            Constraint::new(xy.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(xy, Relation::Ge, Rational::from_int(1)),
            Constraint::new(x_minus_y.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(x_minus_y, Relation::Ge, Rational::from_int(1)),
        ];
        match Simplex::check(&constraints).unwrap() {
            LraResult::Sat(model) => {
                for c in &constraints {
                    assert!(c.is_satisfied(&model), "violated: {c:?}");
                }
            }
            LraResult::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn contradictory_bounds_are_unsat() {
        let constraints = vec![
            Constraint::new(x(), Relation::Le, Rational::from_int(1)),
            Constraint::new(x(), Relation::Ge, Rational::from_int(2)),
        ];
        assert_eq!(Simplex::check(&constraints).unwrap(), LraResult::Unsat);
    }

    #[test]
    fn equality_constraint_pins_variable() {
        let constraints = vec![Constraint::new(x(), Relation::Eq, Rational::from_int(5))];
        match Simplex::check(&constraints).unwrap() {
            LraResult::Sat(model) => assert_eq!(model[&0], Rational::from_int(5)),
            LraResult::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn strict_lower_bound_pivots_strictly_past_it() {
        // x > 1 together with x >= 2 is satisfiable (e.g. x = 2): the strict bound alone must
        // never be mistaken for an unsatisfiable pivot target.
        let constraints = vec![
            Constraint::new(x(), Relation::Gt, Rational::from_int(1)),
            Constraint::new(x(), Relation::Ge, Rational::from_int(2)),
        ];
        match Simplex::check(&constraints).unwrap() {
            LraResult::Sat(model) => {
                for c in &constraints {
                    assert!(c.is_satisfied(&model), "violated: {c:?}");
                }
            }
            LraResult::Unsat => panic!("expected SAT with x=2"),
        }
    }

    #[test]
    fn strict_bound_exactly_at_target_is_unsat() {
        // x < 1 together with x >= 1 has no solution at all, strict or otherwise.
        let constraints = vec![
            Constraint::new(x(), Relation::Lt, Rational::one()),
            Constraint::new(x(), Relation::Ge, Rational::one()),
        ];
        assert_eq!(Simplex::check(&constraints).unwrap(), LraResult::Unsat);
    }
}
