//! Bounded undo/redo history.
//!
//! [`History`] keeps snapshots of editable state taken before each
//! mutation. It knows nothing about persistence: restoring a snapshot only
//! changes in-memory state.

use std::collections::VecDeque;

/// Linear undo/redo stacks over snapshots of `T`.
///
/// Both stacks are newest-first. Recording a new snapshot discards the redo
/// stack, so history never branches.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Default number of undo steps kept.
    pub const DEFAULT_CAPACITY: usize = 50;

    /// Create an empty history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty history keeping at most `capacity` undo steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity.min(64)),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Snapshot `current` before it is mutated.
    pub fn record(&mut self, current: &T) {
        self.push_past(current.clone());
        self.future.clear();
    }

    /// Step back: returns the snapshot to restore, remembering `current`
    /// for redo. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let previous = self.past.pop_front()?;
        self.future.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo. `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.future.pop()?;
        self.push_past(current.clone());
        Some(next)
    }

    /// Rewrite every stored snapshot in place, in both stacks.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.past.iter_mut().for_each(&mut f);
        self.future.iter_mut().for_each(&mut f);
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undo steps available.
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Maximum number of undo steps kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push_past(&mut self, snapshot: T) {
        self.past.push_front(snapshot);
        self.past.truncate(self.capacity);
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_a_no_op() {
        let mut history: History<Vec<u32>> = History::new();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.undo(&vec![1]), None);
        assert_eq!(history.redo(&vec![1]), None);
    }

    #[test]
    fn n_mutations_then_n_undos_restore_start() {
        let mut history = History::new();
        let mut state = vec![0];
        let start = state.clone();

        for n in 1..=5 {
            history.record(&state);
            state.push(n);
        }
        for _ in 0..5 {
            state = history.undo(&state).unwrap();
        }

        assert_eq!(state, start);
        assert!(!history.can_undo());
        assert_eq!(history.redo_depth(), 5);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = History::new();
        let mut state = vec!["a"];
        history.record(&state);
        state.push("b");
        let after = state.clone();

        state = history.undo(&state).unwrap();
        assert_eq!(state, vec!["a"]);
        state = history.redo(&state).unwrap();
        assert_eq!(state, after);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_after_undo_clears_redo() {
        let mut history = History::new();
        let mut state = 1;
        history.record(&state);
        state = 2;
        state = history.undo(&state).unwrap();
        assert!(history.can_redo());

        history.record(&state);
        assert!(!history.can_redo());
        assert_eq!(history.redo(&state), None);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = History::new();
        for n in 0..51 {
            history.record(&n);
        }
        assert_eq!(history.undo_depth(), 50);

        let mut state = 51;
        let mut last = state;
        while let Some(previous) = history.undo(&state) {
            last = previous;
            state = previous;
        }
        // Snapshot 0 was the 51st from the top and got evicted.
        assert_eq!(last, 1);
    }

    #[test]
    fn redo_respects_capacity() {
        let mut history = History::with_capacity(2);
        history.record(&1);
        history.record(&2);
        let restored = history.undo(&3).unwrap();
        assert_eq!(restored, 2);
        history.record(&9);
        history.record(&10);
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut history = History::new();
        history.record(&1);
        history.undo(&2);
        history.record(&3);
        history.undo(&4);
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn for_each_mut_touches_both_stacks() {
        let mut history = History::new();
        history.record(&1);
        history.record(&2);
        let restored = history.undo(&3).unwrap();
        history.for_each_mut(|n| *n *= 10);

        assert_eq!(history.redo(&restored), Some(30));
        assert_eq!(history.undo(&0), Some(restored));
        assert_eq!(history.undo(&0), Some(10));
    }

    #[test]
    fn default_capacity_is_fifty() {
        let history: History<u8> = History::default();
        assert_eq!(history.capacity(), 50);
    }
}
