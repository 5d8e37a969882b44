//! Weight-guided candidate selection for ICP: which (constraint, variable) pair to contract next.

use std::collections::BTreeMap;

use crate::kernel::rational::Rational;
use crate::nra::interval::ExtReal;
use crate::sat::types::Var;

/// One (constraint, variable) pair awaiting contraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub constraint_index: usize,
    pub var: Var,
}

/// Initial weight assigned to every candidate before it has ever been contracted.
fn initial_weight() -> Rational {
    Rational::new(1, 10)
}

/// A weight (strictly positive rational) to non-empty candidate-list map. `choose_contraction_
/// candidate` always returns from the highest-weight bucket, so the cost of picking the next
/// candidate never depends on how many lower-weighted candidates are waiting.
pub struct CandidateStore {
    buckets: BTreeMap<Rational, Vec<Candidate>>,
}

impl CandidateStore {
    pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut buckets: BTreeMap<Rational, Vec<Candidate>> = BTreeMap::new();
        let weight = initial_weight();
        for candidate in candidates {
            buckets.entry(weight).or_default().push(candidate);
        }
        CandidateStore { buckets }
    }

    /// Pops a candidate from the highest-weight bucket, dropping the bucket if it becomes empty.
    pub fn choose_contraction_candidate(&mut self) -> Option<Candidate> {
        let (&weight, bucket) = self.buckets.iter_mut().next_back()?;
        let candidate = bucket.pop();
        if bucket.is_empty() {
            self.buckets.remove(&weight);
        }
        candidate
    }

    /// Reinserts `candidate` under its freshly measured weight.
    pub fn reinsert(&mut self, candidate: Candidate, weight: Rational) {
        self.buckets.entry(weight).or_default().push(candidate);
    }
}

/// `(old_diameter - new_diameter) / old_diameter`, clamped to `[0, 1]` and approximated as a
/// rational since diameters live in the floating `ExtReal` world but candidate weights are exact
/// rationals ordered in a `BTreeMap`. `0` when the old diameter is `0` (nothing left to contract)
/// or when both diameters are infinite (the ratio is indeterminate).
pub fn relative_contraction(old_diameter: ExtReal, new_diameter: ExtReal) -> Rational {
    if old_diameter.value() == 0.0 {
        return Rational::zero();
    }
    if old_diameter.is_infinite() && new_diameter.is_infinite() {
        return Rational::zero();
    }
    if old_diameter.is_infinite() {
        return Rational::one();
    }
    let ratio = ((old_diameter.value() - new_diameter.value()) / old_diameter.value()).clamp(0.0, 1.0);
    const SCALE: i64 = 1_000_000;
    Rational::new((ratio * SCALE as f64).round() as i64, SCALE)
}
