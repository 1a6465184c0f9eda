/// Linear undo/redo log of value snapshots.
///
/// The entry at the cursor always equals the live value; entries past the
/// cursor are redo candidates and are truncated the moment a new snapshot is
/// pushed from a non-terminal cursor. Snapshots are clones, so later
/// mutations of the live value never alias history entries.
#[derive(Clone, Debug)]
pub struct UndoHistory<T: Clone + PartialEq> {
    stack: Vec<T>,
    cursor: usize,
}

impl<T: Clone + PartialEq> UndoHistory<T> {
    pub fn new(initial: T) -> Self {
        Self {
            stack: vec![initial],
            cursor: 0,
        }
    }

    /// Appends a snapshot. A value equal to the cursor entry is dropped so
    /// no-op mutations never grow the log.
    pub fn push_snapshot(&mut self, value: T) {
        if self.stack[self.cursor] == value {
            return;
        }
        if self.cursor + 1 < self.stack.len() {
            self.stack.truncate(self.cursor + 1);
        }
        self.stack.push(value);
        self.cursor = self.stack.len().saturating_sub(1);
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.stack[self.cursor].clone())
    }

    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.stack[self.cursor].clone())
    }

    pub fn clear_with(&mut self, value: T) {
        self.stack.clear();
        self.stack.push(value);
        self.cursor = 0;
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::UndoHistory;

    #[test]
    fn undo_redo_flow() {
        let mut history = UndoHistory::new(vec![1]);
        history.push_snapshot(vec![1, 2]);
        history.push_snapshot(vec![1, 2, 3]);

        assert!(history.can_undo());
        assert_eq!(history.undo(), Some(vec![1, 2]));
        assert_eq!(history.undo(), Some(vec![1]));
        assert!(!history.can_undo());
        assert_eq!(history.undo(), None);

        assert_eq!(history.redo(), Some(vec![1, 2]));
        assert_eq!(history.redo(), Some(vec![1, 2, 3]));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn push_after_undo_truncates_redo_tail() {
        let mut history = UndoHistory::new(vec![0]);
        history.push_snapshot(vec![1]);
        history.push_snapshot(vec![2]);
        history.undo();

        history.push_snapshot(vec![9]);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(vec![1]));
        assert_eq!(history.redo(), Some(vec![9]));
    }

    #[test]
    fn equal_snapshot_is_dropped() {
        let mut history = UndoHistory::new(vec![1]);
        history.push_snapshot(vec![1, 2]);
        let len = history.len();

        history.push_snapshot(vec![1, 2]);
        assert_eq!(history.len(), len);
        assert_eq!(history.undo(), Some(vec![1]));
    }

    #[test]
    fn snapshots_do_not_alias_the_live_value() {
        let mut live = vec![1, 2];
        let mut history = UndoHistory::new(live.clone());
        live.push(3);
        history.push_snapshot(live.clone());
        live.push(4);

        assert_eq!(history.undo(), Some(vec![1, 2]));
        assert_eq!(history.redo(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn clear_resets_to_single_entry() {
        let mut history = UndoHistory::new(vec![1]);
        history.push_snapshot(vec![1, 2]);
        history.clear_with(Vec::new());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
