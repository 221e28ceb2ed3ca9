//! The data provider seam between the timeline UI and durable storage.
//!
//! [`DataProvider`] is the system's one substitution point: the presentation
//! layer only ever holds `Arc<dyn DataProvider>`, so a hosted tabular backend
//! can replace [`LocalDataProvider`] without touching any caller.
//!
//! The local implementation is the only component that understands entity
//! shape: it maps typed records onto generic store rows (and back, validating
//! at the seam) and enforces domain policy: equipment and batch deletion is
//! disabled by product decision, and batch canonical keys must be unique.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use timeline_model::{Batch, BatchPatch, Equipment, EquipmentPatch, Operation, OperationPatch, RecordKind};
use timeline_store::StoreError;

mod local;
mod mapping;

pub use local::LocalDataProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Deleting this record kind is disabled by explicit product policy.
    /// This is not an oversight; the failure must be preserved.
    #[error("deleting {kind} records is disabled by policy (id {id})")]
    DeletionDisabled { kind: RecordKind, id: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("a batch with canonical key {key:?} already exists")]
    DuplicateBatch { key: String },
    #[error("malformed {kind} row: {detail}")]
    Corrupt { kind: RecordKind, detail: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider interface consumed by the presentation layer.
///
/// Object-safe so the backing implementation can be swapped behind
/// `Arc<dyn DataProvider>`.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// All equipment rows. Ordering is the caller's responsibility; the
    /// `sort_order` field is carried through, not applied here.
    async fn get_equipment(&self) -> Result<Vec<Equipment>>;

    async fn get_batches(&self) -> Result<Vec<Batch>>;

    /// Operations whose interval overlaps `[start, end]`, not only those
    /// strictly contained within the window.
    async fn get_operations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Operation>>;

    /// Upsert by id presence: no id creates a new record with a fresh
    /// identifier and explicit defaults; an id updates the existing row and
    /// refreshes its modified timestamp.
    async fn save_equipment(&self, patch: EquipmentPatch) -> Result<Equipment>;

    async fn save_batch(&self, patch: BatchPatch) -> Result<Batch>;

    /// Like [`Self::save_equipment`], except an id that no longer exists
    /// re-inserts under that id; undo/redo reconciliation replays deleted
    /// operations through this path.
    async fn save_operation(&self, patch: OperationPatch) -> Result<Operation>;

    /// Hard delete, unconditional; deleting an absent id is a no-op.
    async fn delete_operation(&self, id: &str) -> Result<()>;

    /// Always fails with [`ProviderError::DeletionDisabled`], leaving no
    /// state mutated.
    async fn delete_equipment(&self, id: &str) -> Result<()>;

    /// Always fails with [`ProviderError::DeletionDisabled`], leaving no
    /// state mutated.
    async fn delete_batch(&self, id: &str) -> Result<()>;

    /// Rewrite `sort_order` for every equipment row so values form a
    /// contiguous, strictly-increasing sequence matching display position.
    /// Ids missing from `ordered_ids` keep their relative order after the
    /// listed ones. Returns the full list in the new order.
    async fn reorder_equipment(&self, ordered_ids: &[String]) -> Result<Vec<Equipment>>;
}
