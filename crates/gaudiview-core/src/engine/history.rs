use crate::core::models::result_set::{ResultSet, TableState};
use std::collections::VecDeque;

/// Number of undo steps kept before the oldest is evicted.
pub const HISTORY_DEPTH: usize = 5;

/// An immutable deep copy of a table's mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    state: TableState,
}

impl Snapshot {
    pub fn capture(results: &ResultSet) -> Self {
        Self {
            state: results.state().clone(),
        }
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn restore_into(&self, results: &mut ResultSet) {
        results.replace_state(self.state.clone());
    }
}

/// Bounded LIFO of snapshots plus the permanent load-time baseline.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    stack: VecDeque<Snapshot>,
    baseline: Snapshot,
    depth: usize,
}

impl UndoHistory {
    pub fn new(results: &ResultSet) -> Self {
        Self::with_depth(results, HISTORY_DEPTH)
    }

    pub fn with_depth(results: &ResultSet, depth: usize) -> Self {
        Self {
            stack: VecDeque::with_capacity(depth),
            baseline: Snapshot::capture(results),
            depth,
        }
    }

    /// Records the current state, evicting the oldest entry when the stack is full.
    pub fn push(&mut self, results: &ResultSet) {
        if self.depth == 0 {
            return;
        }
        if self.stack.len() == self.depth {
            self.stack.pop_front();
        }
        self.stack.push_back(Snapshot::capture(results));
    }

    /// Restores the most recent snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, results: &mut ResultSet) -> bool {
        match self.stack.pop_back() {
            Some(snapshot) => {
                results.replace_state(snapshot.state);
                true
            }
            None => false,
        }
    }

    /// Restores the baseline. The stack is left as it is.
    pub fn reset(&self, results: &mut ResultSet) {
        self.baseline.restore_into(results);
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.stack.back()
    }

    pub fn baseline(&self) -> &Snapshot {
        &self.baseline
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::objective::Objective;
    use crate::core::models::result_set::SortColumn;
    use crate::core::models::solution::Solution;

    fn table() -> ResultSet {
        ResultSet::new(
            "# run",
            vec![Objective::new("Score", None)],
            vec![
                Solution::new("A", vec![3.0]),
                Solution::new("B", vec![1.0]),
                Solution::new("C", vec![2.0]),
            ],
        )
        .unwrap()
    }

    fn first_key(results: &ResultSet) -> &str {
        &results.rows()[0].key
    }

    #[test]
    fn undo_restores_state_before_mutation() {
        let mut results = table();
        let mut history = UndoHistory::new(&results);
        let before = results.clone();

        history.push(&results);
        results.sort(SortColumn::Objective(0), true).unwrap();
        assert_eq!(first_key(&results), "B");

        assert!(history.undo(&mut results));
        assert_eq!(results, before);
        assert!(!history.undo(&mut results));
        assert_eq!(results, before);
    }

    #[test]
    fn snapshots_are_independent_of_later_mutation() {
        let mut results = table();
        let mut history = UndoHistory::new(&results);
        history.push(&results);
        results.remove_rows(&[0, 1]).unwrap();

        assert_eq!(history.latest().unwrap().state().rows().len(), 3);
        assert_eq!(history.baseline().state().rows().len(), 3);
    }

    #[test]
    fn oldest_snapshot_is_evicted_beyond_depth() {
        let mut results = table();
        let mut history = UndoHistory::new(&results);

        for _ in 0..HISTORY_DEPTH + 2 {
            history.push(&results);
            results.remove_rows(&[0]).ok();
            if results.is_empty() {
                results = table();
            }
        }
        assert_eq!(history.len(), HISTORY_DEPTH);

        let mut undone = 0;
        while history.undo(&mut results) {
            undone += 1;
        }
        assert_eq!(undone, HISTORY_DEPTH);
        assert!(!history.can_undo());
    }

    #[test]
    fn reset_restores_baseline_and_keeps_stack() {
        let original = table();
        let mut results = original.clone();
        let mut history = UndoHistory::new(&results);

        history.push(&results);
        results.sort(SortColumn::Objective(0), false).unwrap();
        history.push(&results);
        results.remove_rows(&[1]).unwrap();

        history.reset(&mut results);
        assert_eq!(results, original);
        assert_eq!(history.len(), 2);
    }
}
