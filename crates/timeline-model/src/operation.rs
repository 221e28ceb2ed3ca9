use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An operation bar on the timeline: one piece of work on one equipment row,
/// optionally attributed to a batch.
///
/// `end_time >= start_time` is expected but not enforced here; the timeline
/// widget owns that validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub equipment_id: String,
    /// `None` means "no batch".
    pub batch_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Free-text type tag, e.g. `Production`.
    pub kind: String,
    pub description: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub state_code: String,
    pub status_code: String,
}

impl Operation {
    /// Whether this operation's interval intersects `[start, end]`.
    ///
    /// This is the canonical overlap query: bars partially inside the window
    /// still count, containment is not required.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time <= end && self.end_time >= start
    }

    /// Shift both interval edges by the same delta.
    pub fn shift(&mut self, delta: Duration) {
        self.start_time += delta;
        self.end_time += delta;
    }
}

/// Partial operation fields for a save. An absent `id` means "create new".
///
/// `batch_id` is doubly optional: the outer level distinguishes "leave as is"
/// from an explicit assignment, the inner level allows assigning "no batch".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationPatch {
    pub id: Option<String>,
    pub equipment_id: Option<String>,
    pub batch_id: Option<Option<String>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl OperationPatch {
    /// A full-field update patch for an existing record, as replayed during
    /// undo/redo reconciliation and debounced gesture commits.
    pub fn from_record(op: &Operation) -> Self {
        Self {
            id: Some(op.id.clone()),
            equipment_id: Some(op.equipment_id.clone()),
            batch_id: Some(op.batch_id.clone()),
            start_time: Some(op.start_time),
            end_time: Some(op.end_time),
            kind: Some(op.kind.clone()),
            description: Some(op.description.clone()),
        }
    }
}
