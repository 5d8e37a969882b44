//! Restricts a variable's domain by the candidate set `solve_for` computed for one constraint.

use crate::kernel::rational::Relation;
use crate::nra::interval::{ExtReal, Interval, IntervalUnion};

/// Intersects `current` with the bound implied by `candidates` under `relation`: `<=`/`<` only
/// tighten the upper side, `>=`/`>` only the lower side, `=` tightens both. A strict relation that
/// would leave the domain pinned exactly to the (now excluded) boundary empties it instead.
///
/// `candidates` can have more than one component (an even `kth_root` straddling zero yields a
/// negative and a non-negative branch), so collapsing it to a single `hull()` before applying
/// `<=`/`>=` is wrong whenever there's more than one component: it throws away the gap between
/// the branches (wrongly admitting points that satisfy neither) and can merge an already-unbounded
/// branch into the whole line (wrongly discarding points the other branch alone would have kept).
/// Each component is restricted on its own signed side instead.
pub fn contract(candidates: &IntervalUnion, relation: Relation, current: &IntervalUnion) -> IntervalUnion {
    let mut result = match relation {
        Relation::Eq => current.intersect(candidates),
        Relation::Le | Relation::Lt => match candidates.components() {
            [] => IntervalUnion::empty(),
            [only] => current.intersect_interval(&Interval::new(ExtReal::NEG_INFINITY, only.hi())),
            _ => current.intersect_interval(&inner_gap(candidates)),
        },
        Relation::Ge | Relation::Gt => match candidates.components() {
            [] => IntervalUnion::empty(),
            [only] => current.intersect_interval(&Interval::new(only.lo(), ExtReal::POS_INFINITY)),
            _ => current.intersect(&outer_tails(candidates)),
        },
    };

    if relation.strictness().is_strict() {
        let boundaries = boundary_points(candidates, relation);
        result = IntervalUnion::from_components(
            result
                .components()
                .iter()
                .filter(|c| !(c.lo() == c.hi() && boundaries.contains(&c.lo())))
                .copied()
                .collect(),
        );
    }

    crate::solver_assert_moderate!(result.diameter() <= current.diameter(), "contraction must not widen a domain");
    result
}

/// The innermost edge of `candidates`' negative-signed components and of its non-negative ones:
/// the two root boundaries an even `kth_root` produces around zero.
fn split_edges(candidates: &IntervalUnion) -> (ExtReal, ExtReal) {
    let comps = candidates.components();
    let zero = ExtReal::finite(0.0);
    let neg_hi = comps.iter().filter(|c| c.hi() <= zero).map(Interval::hi).fold(ExtReal::NEG_INFINITY, ExtReal::max);
    let pos_lo = comps.iter().filter(|c| c.lo() >= zero).map(Interval::lo).fold(ExtReal::POS_INFINITY, ExtReal::min);
    (neg_hi, pos_lo)
}

/// The bounded region between the two branches, admissible under `<=`/`<`.
fn inner_gap(candidates: &IntervalUnion) -> Interval {
    let (neg_hi, pos_lo) = split_edges(candidates);
    Interval::new(neg_hi, pos_lo)
}

/// The two unbounded tails beyond each branch, admissible under `>=`/`>`.
fn outer_tails(candidates: &IntervalUnion) -> IntervalUnion {
    let (neg_hi, pos_lo) = split_edges(candidates);
    IntervalUnion::from_components(vec![
        Interval::new(ExtReal::NEG_INFINITY, neg_hi),
        Interval::new(pos_lo, ExtReal::POS_INFINITY),
    ])
}

/// The root values a strict relation must exclude, so a result pinned exactly to one becomes
/// empty rather than a single admitted point.
fn boundary_points(candidates: &IntervalUnion, relation: Relation) -> Vec<ExtReal> {
    match (relation, candidates.components()) {
        (Relation::Lt, [only]) => vec![only.hi()],
        (Relation::Gt, [only]) => vec![only.lo()],
        (Relation::Lt | Relation::Gt, comps) if comps.len() >= 2 => {
            let (neg_hi, pos_lo) = split_edges(candidates);
            vec![neg_hi, pos_lo]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(lo: f64, hi: f64) -> Interval {
        Interval::new(ExtReal::finite(lo), ExtReal::finite(hi))
    }

    #[test]
    fn le_tightens_only_upper_bound() {
        let current = IntervalUnion::single(iv(-10.0, 10.0));
        let candidates = IntervalUnion::single(iv(f64::NEG_INFINITY, 3.0));
        let result = contract(&candidates, Relation::Le, &current);
        assert_eq!(result.hull(), iv(-10.0, 3.0));
    }

    #[test]
    fn eq_tightens_both_sides() {
        let current = IntervalUnion::single(iv(-10.0, 10.0));
        let candidates = IntervalUnion::single(iv(2.0, 2.0));
        let result = contract(&candidates, Relation::Eq, &current);
        assert_eq!(result.hull(), iv(2.0, 2.0));
    }

    #[test]
    fn strict_inequality_pinned_to_boundary_is_empty() {
        let current = IntervalUnion::single(iv(5.0, 5.0));
        let candidates = IntervalUnion::single(iv(f64::NEG_INFINITY, 5.0));
        let result = contract(&candidates, Relation::Lt, &current);
        assert!(result.is_empty());
    }

    #[test]
    fn ge_with_two_branches_keeps_both_tails_not_the_gap() {
        // x^2 >= 4 roots to {..-2} U {2..}; a point in the gap (e.g. 0) must not survive, and a
        // point on the far tail of one branch (e.g. -10) must not be discarded by the other.
        let current = IntervalUnion::single(iv(-20.0, 20.0));
        let candidates = IntervalUnion::from_components(vec![iv(f64::NEG_INFINITY, -2.0), iv(2.0, f64::INFINITY)]);
        let result = contract(&candidates, Relation::Ge, &current);
        assert!(result.components().iter().any(|c| c.contains(ExtReal::finite(-10.0))));
        assert!(!result.components().iter().any(|c| c.contains(ExtReal::finite(0.0))));
        assert!(result.components().iter().any(|c| c.contains(ExtReal::finite(2.0))));
    }

    #[test]
    fn le_with_two_branches_keeps_only_the_gap() {
        // x^2 <= 4 roots to the same two branches, but `<=` wants exactly the interval between
        // them, not either tail.
        let current = IntervalUnion::single(iv(-20.0, 20.0));
        let candidates = IntervalUnion::from_components(vec![iv(f64::NEG_INFINITY, -2.0), iv(2.0, f64::INFINITY)]);
        let result = contract(&candidates, Relation::Le, &current);
        assert_eq!(result.hull(), iv(-2.0, 2.0));
        assert!(!result.components().iter().any(|c| c.contains(ExtReal::finite(-10.0))));
    }

    #[test]
    fn strict_gt_with_two_branches_pinned_to_both_roots_is_empty() {
        let current = IntervalUnion::from_components(vec![iv(-2.0, -2.0), iv(2.0, 2.0)]);
        let candidates = IntervalUnion::from_components(vec![iv(f64::NEG_INFINITY, -2.0), iv(2.0, f64::INFINITY)]);
        let result = contract(&candidates, Relation::Gt, &current);
        assert!(result.is_empty());
    }
}
