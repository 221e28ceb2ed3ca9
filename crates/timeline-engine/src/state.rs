use timeline_model::{Batch, Equipment, Operation};

use crate::history::{History, Snapshot};

/// Board interaction mode. In `View`, the board is read-only and rows with
/// no items inside the current time window are hidden before windowing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoardMode {
    #[default]
    Edit,
    View,
}

/// Authoritative in-memory board state: the loaded collections, the current
/// selection, and the undo/redo history. One instance, owned by the
/// [`crate::SyncEngine`] and mutated only under its lock.
#[derive(Debug, Default)]
pub struct BoardState {
    /// Equipment rows, kept sorted by `(sort_order, id)`.
    pub equipment: Vec<Equipment>,
    pub batches: Vec<Batch>,
    pub operations: Vec<Operation>,
    /// Selected operation ids.
    pub selection: Vec<String>,
    pub mode: BoardMode,
    pub(crate) history: History,
    /// Deep copy of the operation collection taken at the first frame of the
    /// in-flight drag gesture; present only while a gesture is open.
    pub(crate) gesture_base: Option<Snapshot>,
}

impl BoardState {
    pub(crate) fn operation_index(&self, id: &str) -> Option<usize> {
        self.operations.iter().position(|op| op.id == id)
    }

    pub(crate) fn selected_operations(&self) -> Vec<Operation> {
        self.selection
            .iter()
            .filter_map(|id| self.operations.iter().find(|op| op.id == *id))
            .cloned()
            .collect()
    }
}
