//! Fourier-Motzkin elimination, used only as a sound reference oracle to cross-check Simplex —
//! it produces no model, only a UNSAT/not-refuted verdict.

use std::collections::BTreeSet;

use crate::kernel::rational::{Rational, Relation};
use crate::lra::types::{Constraint, LinearTerm};
use crate::sat::types::Var;

/// `Fm::Unsat` means the constraint set is provably unsatisfiable; `Fm::NotRefuted` means
/// elimination found no contradiction (which, for a sound-but-incomplete oracle used only to
/// cross-check Simplex, is read as "Simplex should agree this is SAT").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fm {
    Unsat,
    NotRefuted,
}

/// Every constraint is normalized to `term + constant <= 0` (non-strict) or `< 0` (strict); `=`
/// constraints become two opposing `<=` constraints before elimination begins.
#[derive(Debug, Clone)]
struct Normalized {
    term: LinearTerm,
    constant: Rational,
    strict: bool,
}

impl Normalized {
    fn scale(&self, factor: Rational) -> Normalized {
        Normalized {
            term: self.term.scale(factor),
            constant: self.constant * factor,
            strict: self.strict,
        }
    }

    fn add(&self, other: &Normalized) -> Normalized {
        Normalized {
            term: self.term.add(&other.term),
            constant: self.constant + other.constant,
            strict: self.strict || other.strict,
        }
    }

    fn is_constant(&self) -> bool {
        self.term.is_zero()
    }

    fn violates(&self) -> bool {
        if self.strict {
            self.constant >= Rational::zero()
        } else {
            self.constant > Rational::zero()
        }
    }
}

fn normalize(constraints: &[Constraint]) -> Vec<Normalized> {
    let mut out = Vec::new();
    for c in constraints {
        let as_le = Normalized { term: c.term.clone(), constant: -c.bound, strict: false };
        match c.relation {
            Relation::Le => out.push(as_le),
            Relation::Lt => out.push(Normalized { strict: true, ..as_le }),
            Relation::Ge => out.push(as_le.scale(-Rational::one())),
            Relation::Gt => {
                let mut flipped = as_le.scale(-Rational::one());
                flipped.strict = true;
                out.push(flipped);
            }
            Relation::Eq => {
                out.push(as_le.scale(Rational::one()));
                out.push(as_le.scale(-Rational::one()));
            }
        }
    }
    out
}

/// Eliminates `var` by pairing every constraint with a positive coefficient of `var` against
/// every one with a negative coefficient; the combination's `var` terms cancel by construction.
fn eliminate(constraints: &[Normalized], var: Var) -> Vec<Normalized> {
    let mut lower = Vec::new();
    let mut upper = Vec::new();
    let mut independent = Vec::new();

    for n in constraints {
        let c = n.term.coefficient(var);
        if c.is_zero() {
            independent.push(n.clone());
        } else if c.is_positive() {
            upper.push(n.clone());
        } else {
            lower.push(n.clone());
        }
    }

    let mut combined = independent;
    for up in &upper {
        for lo in &lower {
            let c_up = up.term.coefficient(var);
            let c_lo = lo.term.coefficient(var);
            combined.push(up.scale(c_lo.abs()).add(&lo.scale(c_up.abs())));
        }
    }
    combined
}

/// Decides unsatisfiability of a constraint set by eliminating every variable in turn.
pub fn fourier_motzkin_unsat(constraints: &[Constraint]) -> Fm {
    if constraints.is_empty() {
        return Fm::NotRefuted;
    }

    let mut current = normalize(constraints);
    let vars: BTreeSet<Var> = current.iter().flat_map(|n| n.term.variables()).collect();

    for var in vars {
        current = eliminate(&current, var);
        if current.iter().filter(|n| n.is_constant()).any(Normalized::violates) {
            return Fm::Unsat;
        }
    }

    if current.iter().any(Normalized::violates) {
        Fm::Unsat
    } else {
        Fm::NotRefuted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lra::types::LinearTerm;

    #[test]
    fn detects_direct_contradiction() {
        let x = LinearTerm::single(0, Rational::one());
        let constraints = vec![
            Constraint::new(x.clone(), Relation::Le, Rational::from_int(1)),
            Constraint::new(x, Relation::Ge, Rational::from_int(2)),
        ];
        assert_eq!(fourier_motzkin_unsat(&constraints), Fm::Unsat);
    }

    #[test]
    fn satisfiable_box_not_refuted() {
        let x = LinearTerm::single(0, Rational::one());
        let y = LinearTerm::single(1, Rational::one());
        let xy = x.add(&y);
        let x_minus_y = x.sub(&y);
        let constraints = vec![
            Constraint::new(xy.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(xy, Relation::Ge, Rational::from_int(1)),
            Constraint::new(x_minus_y.clone(), Relation::Le, Rational::from_int(3)),
            Constraint::new(x_minus_y, Relation::Ge, Rational::from_int(1)),
        ];
        assert_eq!(fourier_motzkin_unsat(&constraints), Fm::NotRefuted);
    }

    #[test]
    fn strict_self_contradiction() {
        let x = LinearTerm::single(0, Rational::one());
        let constraints = vec![Constraint::new(x, Relation::Lt, Rational::zero())];
        // x < 0 alone is satisfiable (e.g. x = -1); eliminating x should not refute it.
        assert_eq!(fourier_motzkin_unsat(&constraints), Fm::NotRefuted);
    }
}
