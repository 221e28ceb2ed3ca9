//! Editing engine that sits between the timeline widget and the data
//! provider:
//! - optimistic in-memory mutation with debounced, coalesced persistence
//!   (continuous drag gestures become one commit)
//! - snapshot-based undo/redo reconciled against the provider by diffing
//! - virtual row windowing for a fixed-height viewport
//! - explicit command dispatch for keyboard-driven actions
//!
//! The engine is single-writer and event-driven; async here means awaited
//! provider I/O, not parallelism.

mod commands;
mod history;
mod state;
mod sync;
mod window;

pub use commands::{Command, CommandOutcome};
pub use history::{History, Snapshot, SNAPSHOT_LIMIT};
pub use state::{BoardMode, BoardState};
pub use sync::{
    BatchOverride, DragDelta, EngineError, ResizeEdge, SyncConfig, SyncEngine, SyncNotification,
};
pub use window::{
    ItemSlot, RowSlot, WindowController, WindowMetrics, WindowedView, EXTRA_ROW_FRACTION,
    PLACEHOLDER_ID, WHEEL_STEP_PX,
};
