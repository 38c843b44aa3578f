//! Bounded undo/redo history of full state snapshots.
//!
//! A snapshot is pushed *before* each discrete mutation; drag gestures push
//! exactly one snapshot at pointer-down, so a whole drag undoes in one step.
//! Restoring never touches the caller's live interaction mode — the engine
//! re-applies it after a swap, so undoing content never switches tools.

use eg_core::GraphState;

pub const DEFAULT_DEPTH: usize = 50;

pub struct SnapshotStack {
    undo: Vec<GraphState>,
    redo: Vec<GraphState>,
    max_depth: usize,
}

impl SnapshotStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::with_capacity(max_depth.min(64)),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record a pre-mutation snapshot. Oldest entries fall off past the
    /// depth limit; any redo branch is invalidated.
    pub fn push(&mut self, snapshot: GraphState) {
        self.undo.push(snapshot);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Pop the most recent snapshot, parking `current` on the redo stack.
    pub fn undo(&mut self, current: &GraphState) -> Option<GraphState> {
        let prev = self.undo.pop()?;
        self.redo.push(current.clone());
        Some(prev)
    }

    /// Reverse of [`SnapshotStack::undo`].
    pub fn redo(&mut self, current: &GraphState) -> Option<GraphState> {
        let next = self.redo.pop()?;
        self.undo.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

impl Default for SnapshotStack {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eg_core::CurveSpec;

    #[test]
    fn undo_returns_pushed_snapshot() {
        let mut stack = SnapshotStack::default();
        let empty = GraphState::new();
        let mut live = empty.clone();

        stack.push(live.clone());
        live.push_curve_from_spec(&CurveSpec::default());

        let restored = stack.undo(&live).unwrap();
        assert_eq!(restored, empty);
        assert!(stack.can_redo());

        let redone = stack.redo(&restored).unwrap();
        assert_eq!(redone, live);
    }

    #[test]
    fn push_clears_redo() {
        let mut stack = SnapshotStack::default();
        let state = GraphState::new();
        stack.push(state.clone());
        stack.undo(&state);
        assert!(stack.can_redo());
        stack.push(state);
        assert!(!stack.can_redo());
    }

    #[test]
    fn depth_limit_trims_oldest() {
        let mut stack = SnapshotStack::new(3);
        let state = GraphState::new();
        for _ in 0..5 {
            stack.push(state.clone());
        }
        let mut count = 0;
        while stack.undo(&state).is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[test]
    fn undo_on_empty_is_none() {
        let mut stack = SnapshotStack::default();
        assert!(stack.undo(&GraphState::new()).is_none());
        assert!(stack.redo(&GraphState::new()).is_none());
    }
}
