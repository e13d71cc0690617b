use super::{Direction, HistoryBoundsError, Result};

/// Linear undo/redo history. `index` always points at a live entry when the
/// stack is non-empty.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    entries: Vec<T>,
    index: usize,
}

impl<T> Default for HistoryStack<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
        }
    }
}

impl<T> HistoryStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: T) -> Self {
        Self {
            entries: vec![base],
            index: 0,
        }
    }

    /// Drops every entry after the current one, then appends `state` as the new tail.
    pub fn push(&mut self, state: T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(state);
        self.index = self.entries.len() - 1;
    }

    pub fn undo(&mut self) -> Result<&T> {
        if self.entries.is_empty() || self.index == 0 {
            return Err(self.bounds(Direction::Undo));
        }
        self.index -= 1;
        Ok(&self.entries[self.index])
    }

    pub fn redo(&mut self) -> Result<&T> {
        if self.index + 1 >= self.entries.len() {
            return Err(self.bounds(Direction::Redo));
        }
        self.index += 1;
        Ok(&self.entries[self.index])
    }

    pub fn reset(&mut self, base: T) {
        self.entries.clear();
        self.entries.push(base);
        self.index = 0;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    fn bounds(&self, direction: Direction) -> HistoryBoundsError {
        HistoryBoundsError {
            direction,
            index: self.index,
            len: self.entries.len(),
        }
    }
}
