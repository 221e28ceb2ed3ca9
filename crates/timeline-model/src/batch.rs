use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::OwnerInfo;

/// A production batch.
///
/// The batch number string is the canonical key; `batches_id` is an opaque
/// secondary identifier kept for storage-engine compatibility and must never
/// be used for equality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub batches_id: String,
    pub batch_number: String,
    pub created_on: DateTime<Utc>,
    pub modified_on: DateTime<Utc>,
    pub owner: OwnerInfo,
    pub state_code: String,
}

impl Batch {
    /// The identifier treated as authoritative for equality and lookup:
    /// the batch number when present, otherwise the storage id.
    pub fn canonical_key(&self) -> &str {
        canonical_key(&self.batch_number, &self.batches_id)
    }
}

/// Resolve the canonical key from the two candidate id fields.
pub fn canonical_key<'a>(batch_number: &'a str, batches_id: &'a str) -> &'a str {
    if !batch_number.is_empty() {
        batch_number
    } else {
        batches_id
    }
}

/// Partial batch fields for a save. An absent `batches_id` means "create new".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPatch {
    pub batches_id: Option<String>,
    pub batch_number: Option<String>,
}
