use std::collections::VecDeque;

use timeline_model::Operation;

/// Maximum number of undo snapshots retained; pushing beyond evicts the
/// oldest entry first.
pub const SNAPSHOT_LIMIT: usize = 50;

/// A deep copy of the full operation collection at one point in time; the
/// unit of undo/redo.
pub type Snapshot = Vec<Operation>;

/// Bounded snapshot stacks for undo/redo.
///
/// Stack discipline lives here; reconciling a restored snapshot against the
/// provider is [`crate::SyncEngine`]'s job (`undo`/`redo`), which drives the
/// pops and the replay guard.
#[derive(Debug, Default)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: Vec<Snapshot>,
    replaying: bool,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the pre-gesture state before a mutating action. Clears the redo
    /// stack. Ignored while a replay is in progress so that reconciliation
    /// cannot pollute the stack it is reading from.
    pub fn record(&mut self, snapshot: Snapshot) {
        if self.replaying {
            return;
        }
        self.redo.clear();
        self.push_undo(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Low-level stack ops used by the engine's undo/redo replay. `push_undo`
    /// keeps the bound but does not clear redo; only [`History::record`]
    /// does that.
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        if self.undo.len() == SNAPSHOT_LIMIT {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
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

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn set_replaying(&mut self, replaying: bool) {
        self.replaying = replaying;
    }
}
