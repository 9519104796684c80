use super::tools::DrawAction;

/// Committed actions in paint order plus the buffer of undone ones.
///
/// Actions are moved between the two sequences, never copied, so an action
/// lives in exactly one of them at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionHistory {
    actions: Vec<DrawAction>,
    redo: Vec<DrawAction>,
}

impl ActionHistory {
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
            redo: Vec::new(),
        }
    }

    pub fn actions(&self) -> &[DrawAction] {
        &self.actions
    }

    /// Undone actions, oldest undo first; the last entry is the next redo.
    pub fn redo_buffer(&self) -> &[DrawAction] {
        &self.redo
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.actions.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn commit(&mut self, action: DrawAction) {
        self.actions.push(action);
        self.redo.clear();
    }

    pub fn undo(&mut self) -> bool {
        match self.actions.pop() {
            Some(action) => {
                self.redo.push(action);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(action) => {
                self.actions.push(action);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.redo.clear();
    }
}
