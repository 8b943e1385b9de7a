use std::collections::VecDeque;

use model_types::{Constraint, Group, GroupId, Request};

use crate::store::ParamStore;

/// Everything the user can change, captured before an edit.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub groups: Vec<Group>,
    pub requests: Vec<Request>,
    pub constraints: Vec<Constraint>,
    pub params: ParamStore,
    pub active_group: Option<GroupId>,
}

/// Two-stack undo/redo history with a bounded depth.
#[derive(Debug)]
pub struct UndoStack {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    max_depth: usize,
}

impl UndoStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record a snapshot taken before a new edit, clearing the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.push_undo_only(snapshot);
        self.redo.clear();
    }

    /// Push onto the undo stack without clearing redo.
    /// Used by redo to re-populate the undo stack.
    pub fn push_undo_only(&mut self, snapshot: Snapshot) {
        self.undo.push_back(snapshot);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }

    pub fn pop_undo(&mut self) -> Option<Snapshot> {
        self.undo.pop_back()
    }

    pub fn push_redo(&mut self, snapshot: Snapshot) {
        self.redo.push(snapshot);
    }

    pub fn pop_redo(&mut self) -> Option<Snapshot> {
        self.redo.pop()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(active: Option<GroupId>) -> Snapshot {
        Snapshot {
            groups: Vec::new(),
            requests: Vec::new(),
            constraints: Vec::new(),
            params: ParamStore::new(),
            active_group: active,
        }
    }

    #[test]
    fn depth_limit_drops_oldest() {
        let mut stack = UndoStack::new(2);
        let first = GroupId::new_v4();
        stack.push(snapshot(Some(first)));
        stack.push(snapshot(None));
        stack.push(snapshot(None));
        assert_eq!(stack.pop_undo().unwrap().active_group, None);
        assert_eq!(stack.pop_undo().unwrap().active_group, None);
        assert!(!stack.can_undo());
    }

    #[test]
    fn long_history_keeps_newest_in_order() {
        let mut stack = UndoStack::new(3);
        let ids: Vec<GroupId> = (0..10).map(|_| GroupId::new_v4()).collect();
        for id in &ids {
            stack.push(snapshot(Some(*id)));
        }
        for id in ids.iter().rev().take(3) {
            assert_eq!(stack.pop_undo().unwrap().active_group, Some(*id));
        }
        assert!(stack.pop_undo().is_none());
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut stack = UndoStack::new(10);
        stack.push_redo(snapshot(None));
        assert!(stack.can_redo());
        stack.push(snapshot(None));
        assert!(!stack.can_redo());
    }
}
