//! Linear undo/redo over serialized annotation snapshots
//!
//! Every committed mutation pushes the JSON form of the full object list.
//! Restoring decodes it again, dispatching each object on its `type` tag.

use crate::domain::AnnotationObject;

/// Immutable serialized object list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySnapshot(String);

impl HistorySnapshot {
    pub fn capture(objects: &[AnnotationObject]) -> serde_json::Result<Self> {
        serde_json::to_string(objects).map(Self)
    }

    pub fn empty() -> Self {
        Self("[]".to_string())
    }

    pub fn restore(&self) -> serde_json::Result<Vec<AnnotationObject>> {
        serde_json::from_str(&self.0)
    }

    pub fn as_json(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug)]
pub struct HistoryManager {
    /// Never empty: the bottom entry is the initial state
    undo_stack: Vec<HistorySnapshot>,
    redo_stack: Vec<HistorySnapshot>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::len_without_is_empty)]
impl HistoryManager {
    /// History holding only the initial empty snapshot
    pub fn new() -> Self {
        Self {
            undo_stack: vec![HistorySnapshot::empty()],
            redo_stack: Vec::new(),
        }
    }

    /// Record `objects` as the newest state and drop any redo branch
    pub fn commit(&mut self, objects: &[AnnotationObject]) {
        match HistorySnapshot::capture(objects) {
            Ok(snapshot) => {
                self.undo_stack.push(snapshot);
                self.redo_stack.clear();
                log::debug!(
                    "History commit: {} objects, depth {}",
                    objects.len(),
                    self.undo_stack.len()
                );
            }
            Err(e) => log::error!("Failed to capture history snapshot: {}", e),
        }
    }

    /// Step back one commit. `None` when only the initial state remains.
    pub fn undo(&mut self) -> Option<Vec<AnnotationObject>> {
        if !self.can_undo() {
            return None;
        }
        let top = self.undo_stack.pop()?;
        self.redo_stack.push(top);
        self.current()
    }

    /// Re-apply the last undone commit. `None` when nothing was undone.
    pub fn redo(&mut self) -> Option<Vec<AnnotationObject>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next);
        self.current()
    }

    /// Object list of the most recent commit
    pub fn current(&self) -> Option<Vec<AnnotationObject>> {
        let top = self.undo_stack.last()?;
        match top.restore() {
            Ok(objects) => Some(objects),
            Err(e) => {
                log::error!("Failed to restore history snapshot: {}", e);
                None
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots on the undo stack, including the initial one
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Back to a single empty snapshot
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.undo_stack.push(HistorySnapshot::empty());
        self.redo_stack.clear();
    }
}
