use std::collections::VecDeque;

pub const DEFAULT_HISTORY_DEPTH: usize = 20;

/// Bounded undo/redo stacks of whole-surface snapshots.
///
/// The top of the undo sequence is always the state currently on screen, so
/// undo needs at least two entries and returns the entry below the top.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawHistory<T> {
    undo_stack: VecDeque<T>,
    redo_stack: VecDeque<T>,
    depth: usize,
}

impl<T> Default for DrawHistory<T> {
    fn default() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> DrawHistory<T> {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            depth: depth.max(1),
        }
    }

    /// Fresh history whose only entry is `base`.
    pub fn seeded(base: T, depth: usize) -> Self {
        let mut history = Self::with_depth(depth);
        history.undo_stack.push_back(base);
        history
    }

    pub fn push(&mut self, snapshot: T) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.depth {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    pub fn current(&self) -> Option<&T> {
        self.undo_stack.back()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Entry [`undo`](Self::undo) would return, without moving anything.
    pub fn peek_undo(&self) -> Option<&T> {
        let len = self.undo_stack.len();
        if len < 2 {
            return None;
        }
        self.undo_stack.get(len - 2)
    }

    pub fn peek_redo(&self) -> Option<&T> {
        self.redo_stack.front()
    }

    pub fn undo_entries(&self) -> impl Iterator<Item = &T> {
        self.undo_stack.iter()
    }

    pub fn reset(&mut self, base: Option<T>) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        if let Some(base) = base {
            self.undo_stack.push_back(base);
        }
    }
}

impl<T: Clone> DrawHistory<T> {
    pub fn undo(&mut self) -> Option<T> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop_back()?;
        self.redo_stack.push_front(current);
        self.undo_stack.back().cloned()
    }

    pub fn redo(&mut self) -> Option<T> {
        let next = self.redo_stack.pop_front()?;
        self.undo_stack.push_back(next.clone());
        Some(next)
    }
}
