//! SQLite-backed record store for the operations timeline.
//!
//! This crate is intentionally self-contained and knows nothing about
//! scheduling semantics; it exposes:
//! - idempotent schema creation plus additive column migration
//! - generic typed-row CRUD over the three domain tables
//! - whole-database binary export/import (one self-contained byte buffer)
//! - a deterministic demo seed on first-ever initialization
//!
//! Every mutating call fully persists before returning; there is never a
//! partial-write window visible to callers.

mod schema;
mod seed;
mod store;
mod value;

pub use store::{RecordStore, Result, StoreError};
pub use value::{Record, Value};

/// Table names owned by the schema.
pub mod tables {
    pub const EQUIPMENT: &str = "equipment";
    pub const BATCHES: &str = "batches";
    pub const OPERATIONS: &str = "operations";

    /// All tables, in creation order.
    pub const ALL: [&str; 3] = [EQUIPMENT, BATCHES, OPERATIONS];
}
