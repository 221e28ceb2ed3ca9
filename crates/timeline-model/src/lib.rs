//! Core in-memory data model for the operations timeline.
//!
//! Plain domain records for the three entity kinds the scheduling board works
//! with (equipment rows, production batches, operation bars), plus the patch
//! types used for partial saves. Nothing here touches storage; the provider
//! crate maps these records onto store rows.

use core::fmt;

use serde::{Deserialize, Serialize};

mod batch;
mod equipment;
mod operation;

pub use batch::{canonical_key, Batch, BatchPatch};
pub use equipment::{Equipment, EquipmentPatch};
pub use operation::{Operation, OperationPatch};

/// The three record kinds the board persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Equipment,
    Batch,
    Operation,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Equipment => f.write_str("equipment"),
            RecordKind::Batch => f.write_str("batch"),
            RecordKind::Operation => f.write_str("operation"),
        }
    }
}

/// Ownership metadata carried on every persisted record.
///
/// Kept verbatim from the upstream tabular service schema so a hosted backend
/// can be substituted behind the provider seam without remapping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub yomi_name: String,
}

impl Default for OwnerInfo {
    fn default() -> Self {
        Self {
            id: "system".to_string(),
            name: "System".to_string(),
            kind: "systemuser".to_string(),
            yomi_name: String::new(),
        }
    }
}

/// Generate a fresh record identifier.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
