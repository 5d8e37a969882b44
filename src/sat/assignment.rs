//! The Boolean trail: a partial variable assignment annotated with decision levels and reasons.

use std::fmt;

use crate::sat::types::{Literal, Var};

/// Why a literal ended up on the trail.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Decision,
    /// Propagated by unit propagation on the clause at this index into the clause database.
    Propagated(usize),
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Decision => write!(f, "decision"),
            Reason::Propagated(idx) => write!(f, "propagated by clause {idx}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct VarInfo {
    value: Option<bool>,
    decision_level: usize,
    reason: Reason,
}

impl Default for VarInfo {
    fn default() -> Self {
        VarInfo { value: None, decision_level: 0, reason: Reason::Decision }
    }
}

/// The ordered history of assignments, each tagged with a decision level and reason, plus
/// per-variable lookup so `value_of`/`decision_level_of` are O(1).
#[derive(Debug, Clone, Default)]
pub struct Trail {
    info: Vec<VarInfo>,
    order: Vec<Literal>,
    current_level: usize,
}

impl Trail {
    pub fn new(num_variables: usize) -> Self {
        Trail {
            info: vec![VarInfo::default(); num_variables],
            order: Vec::new(),
            current_level: 0,
        }
    }

    pub fn decision_level(&self) -> usize {
        self.current_level
    }

    pub fn increase_decision_level(&mut self) {
        self.current_level += 1;
    }

    pub fn value_of(&self, var: Var) -> Option<bool> {
        self.info.get(var).and_then(|i| i.value)
    }

    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.value_of(lit.var()).map(|v| lit.holds_under(v))
    }

    pub fn decision_level_of(&self, var: Var) -> usize {
        self.info[var].decision_level
    }

    pub fn reason_of(&self, var: Var) -> Reason {
        self.info[var].reason
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.info[var].value.is_some()
    }

    pub fn first_unassigned(&self, activity_order: &[Var]) -> Option<Var> {
        activity_order.iter().copied().find(|&v| !self.is_assigned(v))
    }

    /// Pushes `lit` onto the trail at the current decision level with the given reason.
    pub fn assign(&mut self, lit: Literal, reason: Reason) {
        let var = lit.var();
        self.info[var] = VarInfo {
            value: Some(lit.is_positive()),
            decision_level: self.current_level,
            reason,
        };
        self.order.push(lit);
    }

    pub fn trail(&self) -> &[Literal] {
        &self.order
    }

    /// Undoes every assignment made at a decision level strictly above `level`, resetting the
    /// current decision level to `level`.
    pub fn backtrack_to(&mut self, level: usize) {
        while let Some(&lit) = self.order.last() {
            let var = lit.var();
            if self.info[var].decision_level <= level {
                break;
            }
            self.info[var] = VarInfo::default();
            self.order.pop();
        }
        self.current_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_and_backtrack() {
        let mut trail = Trail::new(3);
        trail.assign(Literal::positive(0), Reason::Decision);
        trail.increase_decision_level();
        trail.assign(Literal::negative(1), Reason::Decision);
        assert_eq!(trail.decision_level(), 1);
        assert_eq!(trail.value_of(1), Some(false));

        trail.backtrack_to(0);
        assert_eq!(trail.decision_level(), 0);
        assert_eq!(trail.value_of(1), None);
        assert_eq!(trail.value_of(0), Some(true));
    }

    #[test]
    fn literal_value_respects_polarity() {
        let mut trail = Trail::new(1);
        trail.assign(Literal::negative(0), Reason::Decision);
        assert_eq!(trail.literal_value(Literal::negative(0)), Some(true));
        assert_eq!(trail.literal_value(Literal::positive(0)), Some(false));
    }
}
