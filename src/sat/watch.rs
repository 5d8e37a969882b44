//! Two-watched-literal index: for each literal, the set of clauses currently watching it.

use std::collections::HashMap;

use crate::sat::types::Literal;

/// Maps a watched literal to the indices (into the clause database) of clauses watching it.
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    watchers: HashMap<Literal, Vec<usize>>,
}

impl WatchList {
    pub fn new() -> Self {
        WatchList::default()
    }

    pub fn watch(&mut self, lit: Literal, clause_idx: usize) {
        self.watchers.entry(lit).or_default().push(clause_idx);
    }

    /// Removes `clause_idx` from `lit`'s watcher list, used when a replacement watch is found.
    pub fn unwatch(&mut self, lit: Literal, clause_idx: usize) {
        if let Some(list) = self.watchers.get_mut(&lit) {
            list.retain(|&idx| idx != clause_idx);
        }
    }

    /// Takes the current watcher list for `lit`, leaving an empty one in its place. Propagation
    /// rebuilds the list in-place as it processes each watcher, so this must be drained rather
    /// than iterated directly.
    pub fn take(&mut self, lit: Literal) -> Vec<usize> {
        self.watchers.remove(&lit).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_unwatch_roundtrip() {
        let mut watches = WatchList::new();
        let lit = Literal::positive(0);
        watches.watch(lit, 7);
        watches.watch(lit, 9);
        watches.unwatch(lit, 7);
        assert_eq!(watches.take(lit), vec![9]);
        assert_eq!(watches.take(lit), Vec::<usize>::new());
    }
}
