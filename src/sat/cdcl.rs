//! Production CDCL: two-watched-literal propagation, 1UIP conflict analysis,
//! non-chronological backjumping and a VSIDS-like activity heuristic.

use log::{debug, trace};

use crate::sat::assignment::{Reason, Trail};
use crate::sat::dpll::SatResult;
use crate::sat::types::{Clause, Cnf, Literal, Var};
use crate::sat::watch::WatchList;
use std::collections::BTreeMap;

/// Running statistics, logged at `debug!` once solving concludes. Tracked via a
/// cumulative-moving-average, kept small since this core has no CLI to print them.
#[derive(Debug, Default, Clone, Copy)]
struct CumulativeMovingAverage {
    sum: u64,
    num_terms: u64,
}

impl CumulativeMovingAverage {
    fn add_term(&mut self, term: u64) {
        self.sum += term;
        self.num_terms += 1;
    }

    fn value(&self) -> f64 {
        if self.num_terms > 0 {
            self.sum as f64 / self.num_terms as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    num_decisions: u64,
    num_conflicts: u64,
    num_propagations: u64,
    average_learned_clause_length: CumulativeMovingAverage,
}

impl Counters {
    fn log_statistics(&self) {
        debug!("numberOfDecisions={}", self.num_decisions);
        debug!("numberOfConflicts={}", self.num_conflicts);
        debug!("numberOfPropagations={}", self.num_propagations);
        debug!(
            "averageLearnedClauseLength={}",
            self.average_learned_clause_length.value()
        );
    }
}

/// The 1UIP-derived outcome of conflict analysis.
#[derive(Debug, Clone)]
struct ConflictAnalysisResult {
    /// The learned clause with the asserting (UIP) literal at index 0.
    learned_literals: Vec<Literal>,
    /// The decision level to backtrack to.
    backjump_level: usize,
}

/// State of the CDCL search loop: ready/solving/conflict/infeasible, collapsed to what this core
/// actually needs since there are no assumptions here.
#[derive(Debug, Default)]
enum CdclState {
    #[default]
    Searching,
    Sat,
    Unsat,
}

/// The production CDCL solver.
pub struct Cdcl {
    clauses: Vec<Clause>,
    watches: WatchList,
    trail: Trail,
    activity: Vec<f64>,
    activity_increment: f64,
    activity_decay: f64,
    num_vars: usize,
    counters: Counters,
    state: CdclState,
}

const ACTIVITY_DECAY_FACTOR: f64 = 0.95;
const ACTIVITY_RESCALE_THRESHOLD: f64 = 1e100;

impl Cdcl {
    pub fn new(cnf: &Cnf) -> Self {
        let num_vars = cnf.num_variables();
        let mut solver = Cdcl {
            clauses: Vec::new(),
            watches: WatchList::new(),
            trail: Trail::new(num_vars),
            activity: vec![0.0; num_vars],
            activity_increment: 1.0,
            activity_decay: ACTIVITY_DECAY_FACTOR,
            num_vars,
            counters: Counters::default(),
            state: CdclState::Searching,
        };
        for clause in cnf.clauses() {
            solver.add_clause(clause.literals().to_vec(), false);
        }
        solver
    }

    fn add_clause(&mut self, literals: Vec<Literal>, is_learned: bool) {
        let idx = self.clauses.len();
        let clause = Clause::new(literals, is_learned);
        if clause.is_empty() {
            self.state = CdclState::Unsat;
        } else if clause.len() == 1 {
            // unit clauses need no watches; assign directly if not already contradicted.
            let lit = clause[0];
            match self.trail.literal_value(lit) {
                Some(false) => self.state = CdclState::Unsat,
                Some(true) => {}
                None => self.trail.assign(lit, Reason::Propagated(idx)),
            }
            self.clauses.push(clause);
        } else {
            let lit0 = self.clauses_literal(&clause, 0);
            let lit1 = self.clauses_literal(&clause, 1);
            self.clauses.push(clause);
            self.watches.watch(lit0, idx);
            self.watches.watch(lit1, idx);
        }
    }

    fn clauses_literal(&self, clause: &Clause, i: usize) -> Literal {
        clause.literals()[i]
    }

    fn bump_activity(&mut self, var: Var) {
        self.activity[var] += self.activity_increment;
        if self.activity[var] > ACTIVITY_RESCALE_THRESHOLD {
            for a in &mut self.activity {
                *a /= ACTIVITY_RESCALE_THRESHOLD;
            }
            self.activity_increment /= ACTIVITY_RESCALE_THRESHOLD;
        }
    }

    fn decay_activities(&mut self) {
        self.activity_increment /= self.activity_decay;
    }

    /// Picks the unassigned variable with highest activity, ties broken by lowest id.
    fn pick_decision_var(&self) -> Option<Var> {
        (0..self.num_vars)
            .filter(|&v| !self.trail.is_assigned(v))
            .max_by(|&a, &b| {
                self.activity[a]
                    .partial_cmp(&self.activity[b])
                    .expect("activity is always finite")
                    .then(b.cmp(&a))
            })
    }

    /// Propagates to a fixed point. Returns the index of a falsified clause on conflict.
    fn propagate(&mut self) -> Option<usize> {
        let mut queue_idx = 0;
        loop {
            let trail_snapshot = self.trail.trail().to_vec();
            if queue_idx >= trail_snapshot.len() {
                return None;
            }
            let lit = trail_snapshot[queue_idx];
            queue_idx += 1;
            let falsified = !lit;
            trace!("propagating {lit}, scanning watchers of {falsified}");

            let watchers = self.watches.take(falsified);
            let mut still_watching = Vec::new();
            let mut conflict = None;

            for clause_idx in watchers {
                if self.clauses[clause_idx].is_deleted() {
                    continue;
                }
                // normalize so literals[0] is the falsified watch
                if self.clauses[clause_idx][0] != falsified {
                    self.clauses[clause_idx].swap_literals(0, 1);
                }
                let other = self.clauses[clause_idx][1];
                if self.trail.literal_value(other) == Some(true) {
                    still_watching.push(clause_idx);
                    continue;
                }

                let mut found_replacement = false;
                let len = self.clauses[clause_idx].len();
                for i in 2..len {
                    let candidate = self.clauses[clause_idx][i];
                    if self.trail.literal_value(candidate) != Some(false) {
                        self.clauses[clause_idx].swap_literals(0, i);
                        self.watches.watch(candidate, clause_idx);
                        found_replacement = true;
                        break;
                    }
                }
                if found_replacement {
                    continue;
                }

                still_watching.push(clause_idx);
                match self.trail.literal_value(other) {
                    Some(false) => {
                        conflict = Some(clause_idx);
                        break;
                    }
                    None => {
                        self.trail.assign(other, Reason::Propagated(clause_idx));
                        self.counters.num_propagations += 1;
                    }
                    Some(true) => unreachable!("handled above"),
                }
            }

            for clause_idx in still_watching {
                self.watches.watch(falsified, clause_idx);
            }

            if let Some(confl) = conflict {
                return Some(confl);
            }
        }
    }

    /// Resolves the conflict at `conflict_clause` into a 1UIP learned clause and backjump level.
    fn analyze(&mut self, conflict_clause: usize) -> ConflictAnalysisResult {
        let current_level = self.trail.decision_level();
        let mut seen = vec![false; self.num_vars];
        let mut learned_literals: Vec<Literal> = Vec::new();
        let mut path_count = 0usize;
        let mut reason_clause = conflict_clause;
        let mut trail_index = self.trail.trail().len();
        let mut p: Option<Literal> = None;

        loop {
            let reason_literals: Vec<Literal> = self.clauses[reason_clause].literals().to_vec();
            for &q in &reason_literals {
                if Some(q) == p {
                    continue;
                }
                let var = q.var();
                if seen[var] {
                    continue;
                }
                let level = self.trail.decision_level_of(var);
                if level == 0 {
                    // root-level literals are always false and contribute nothing to the
                    // learned clause.
                    continue;
                }
                seen[var] = true;
                self.bump_activity(var);
                if level == current_level {
                    path_count += 1;
                } else {
                    learned_literals.push(q);
                }
            }

            // walk the trail backwards to the next seen variable
            loop {
                trail_index -= 1;
                let lit = self.trail.trail()[trail_index];
                if seen[lit.var()] {
                    p = Some(lit);
                    break;
                }
            }
            let var = p.expect("loop always assigns p before breaking").var();
            seen[var] = false;
            path_count -= 1;
            if path_count == 0 {
                break;
            }
            reason_clause = match self.trail.reason_of(var) {
                Reason::Propagated(idx) => idx,
                Reason::Decision => {
                    unreachable!("a variable with remaining unresolved paths must be propagated")
                }
            };
        }

        let uip_literal = !p.expect("1UIP literal always found before loop exits");
        let mut learned = Vec::with_capacity(learned_literals.len() + 1);
        learned.push(uip_literal);
        learned.extend(learned_literals);

        let backjump_level = learned[1..]
            .iter()
            .map(|lit| self.trail.decision_level_of(lit.var()))
            .max()
            .unwrap_or(0);

        crate::solver_assert_moderate!(
            backjump_level < current_level,
            "conflict analysis must backjump strictly below the conflicting decision level"
        );

        self.counters
            .average_learned_clause_length
            .add_term(learned.len() as u64);

        ConflictAnalysisResult { learned_literals: learned, backjump_level }
    }

    fn backjump(&mut self, result: &ConflictAnalysisResult) {
        self.trail.backtrack_to(result.backjump_level);
        let idx = self.clauses.len();
        let uip = result.learned_literals[0];
        self.add_clause(result.learned_literals.clone(), true);
        if result.learned_literals.len() >= 2 {
            debug!(
                "backjump to level {} asserting {uip} via learned clause {idx}",
                result.backjump_level
            );
            self.trail.assign(uip, Reason::Propagated(idx));
        } else {
            debug!("backjump to level 0 asserting unit {uip}");
        }
    }

    fn extract_model(&self) -> BTreeMap<Var, bool> {
        (0..self.num_vars)
            .map(|v| (v, self.trail.value_of(v).unwrap_or(false)))
            .collect()
    }

    /// Runs the CDCL search loop to completion.
    pub fn solve(mut self) -> SatResult {
        if matches!(self.state, CdclState::Unsat) {
            return SatResult::Unsat;
        }

        loop {
            if let Some(conflict_clause) = self.propagate() {
                self.counters.num_conflicts += 1;
                if self.trail.decision_level() == 0 {
                    self.state = CdclState::Unsat;
                    break;
                }
                let analysis = self.analyze(conflict_clause);
                self.decay_activities();
                self.backjump(&analysis);
                continue;
            }

            match self.pick_decision_var() {
                None => {
                    self.state = CdclState::Sat;
                    break;
                }
                Some(var) => {
                    self.counters.num_decisions += 1;
                    self.trail.increase_decision_level();
                    self.trail.assign(Literal::negative(var), Reason::Decision);
                    trace!("decided -{var} at level {}", self.trail.decision_level());
                }
            }
        }

        self.counters.log_statistics();
        match self.state {
            CdclState::Sat => SatResult::Sat(self.extract_model()),
            CdclState::Unsat => SatResult::Unsat,
            CdclState::Searching => unreachable!("loop only exits via Sat or Unsat"),
        }
    }
}

/// Decides satisfiability of `cnf` via the production CDCL engine.
pub fn cdcl(cnf: &Cnf) -> SatResult {
    Cdcl::new(cnf).solve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::types::{Cnf, Literal};

    fn check_model(cnf: &Cnf, model: &BTreeMap<Var, bool>) {
        for clause in cnf.clauses() {
            let satisfied = clause
                .literals()
                .iter()
                .any(|lit| model.get(&lit.var()).is_some_and(|&v| lit.holds_under(v)));
            assert!(satisfied, "clause {clause} not satisfied by model {model:?}");
        }
    }

    #[test]
    fn unsat_small_instance() {
        let mut cnf = Cnf::new();
        cnf.add_clause(vec![Literal::positive(0), Literal::positive(1)]);
        cnf.add_clause(vec![Literal::negative(0), Literal::positive(1)]);
        cnf.add_clause(vec![Literal::negative(1)]);
        assert_eq!(cdcl(&cnf), SatResult::Unsat);
    }

    #[test]
    fn sat_small_instance() {
        let mut cnf = Cnf::new();
        cnf.add_clause(vec![Literal::positive(0), Literal::positive(1)]);
        cnf.add_clause(vec![Literal::negative(0), Literal::negative(1)]);
        match cdcl(&cnf) {
            SatResult::Sat(model) => check_model(&cnf, &model),
            SatResult::Unsat => panic!("expected SAT"),
        }
    }

    #[test]
    fn conflict_triggers_backjump_across_multiple_levels() {
        let mut cnf = Cnf::new();
        // forces a decision on var 2, then a conflict whose learned clause skips level 1.
        cnf.add_clause(vec![Literal::negative(0), Literal::negative(1), Literal::positive(2)]);
        cnf.add_clause(vec![Literal::negative(0), Literal::negative(1), Literal::negative(2)]);
        cnf.add_clause(vec![Literal::positive(0)]);
        cnf.add_clause(vec![Literal::positive(1)]);
        match cdcl(&cnf) {
            SatResult::Unsat => panic!("expected SAT"),
            SatResult::Sat(model) => check_model(&cnf, &model),
        }
    }

    #[test]
    fn empty_cnf_is_sat() {
        let cnf = Cnf::new();
        assert!(matches!(cdcl(&cnf), SatResult::Sat(_)));
    }

    #[test]
    fn conflicting_units_are_unsat() {
        let mut cnf = Cnf::new();
        cnf.add_clause(vec![Literal::positive(0)]);
        cnf.add_clause(vec![Literal::negative(0)]);
        assert_eq!(cdcl(&cnf), SatResult::Unsat);
    }
}
