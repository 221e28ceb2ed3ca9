use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::warn;

use timeline_model::{new_record_id, Operation, OperationPatch};
use timeline_provider::{DataProvider, ProviderError};

use crate::state::{BoardMode, BoardState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resize is unavailable while multiple operations are selected")]
    ResizeWithMultiSelection,
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
    #[error("operation patch has no id")]
    PatchWithoutId,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last drag frame before the gesture commits.
    pub debounce: Duration,
    /// Time shift applied to duplicated operations.
    pub duplicate_offset: chrono::Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            duplicate_offset: chrono::Duration::hours(24),
        }
    }
}

/// Coarse user-facing notifications from background persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotification {
    SaveFailed { failed: usize, attempted: usize },
}

/// In-memory delta of one drag frame, relative to the gesture-start
/// positions (not the previous frame), so the gesture is reversible and
/// frame-rate independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDelta {
    pub time: chrono::Duration,
    /// Equipment row displacement, in display positions.
    pub row_shift: i64,
}

impl Default for DragDelta {
    fn default() -> Self {
        Self {
            time: chrono::Duration::zero(),
            row_shift: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Start,
    End,
}

/// Batch assignment applied to duplicated operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOverride {
    Keep,
    Clear,
    Assign(String),
}

/// Optimistic-edit engine: applies gestures to in-memory state immediately
/// and coalesces their persistence.
///
/// Drag frames mutate memory only; a single pending timer (reset on every
/// frame) commits the whole gesture once input has been quiet for
/// [`SyncConfig::debounce`]: one history snapshot and one save per affected
/// record, issued in parallel. Discrete gestures (resize, duplicate, delete,
/// field edit) persist immediately.
///
/// Background save failures are logged and surfaced through the notification
/// channel; the optimistic in-memory state is deliberately not rolled back.
pub struct SyncEngine {
    provider: Arc<dyn DataProvider>,
    state: Arc<Mutex<BoardState>>,
    config: SyncConfig,
    pending: Mutex<Option<JoinHandle<()>>>,
    notifications: UnboundedSender<SyncNotification>,
}

impl SyncEngine {
    pub fn new(
        provider: Arc<dyn DataProvider>,
    ) -> (Arc<Self>, UnboundedReceiver<SyncNotification>) {
        Self::with_config(provider, SyncConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn DataProvider>,
        config: SyncConfig,
    ) -> (Arc<Self>, UnboundedReceiver<SyncNotification>) {
        let (notifications, receiver) = unbounded_channel();
        let engine = Arc::new(Self {
            provider,
            state: Arc::new(Mutex::new(BoardState::default())),
            config,
            pending: Mutex::new(None),
            notifications,
        });
        (engine, receiver)
    }

    /// Load the collections for the given time window into memory.
    pub async fn load(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let mut equipment = self.provider.get_equipment().await?;
        equipment.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        let batches = self.provider.get_batches().await?;
        let operations = self.provider.get_operations(start, end).await?;

        let mut state = self.lock_state();
        state.equipment = equipment;
        state.batches = batches;
        state.operations = operations;
        state.selection.clear();
        Ok(())
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock_state().operations.clone()
    }

    pub fn selection(&self) -> Vec<String> {
        self.lock_state().selection.clone()
    }

    pub fn set_selection(&self, ids: Vec<String>) {
        self.lock_state().selection = ids;
    }

    pub fn mode(&self) -> BoardMode {
        self.lock_state().mode
    }

    pub fn set_mode(&self, mode: BoardMode) {
        self.lock_state().mode = mode;
    }

    pub fn can_undo(&self) -> bool {
        self.lock_state().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock_state().history.can_redo()
    }

    /// Current undo-stack depth (diagnostics; one entry per undoable gesture).
    pub fn undo_depth(&self) -> usize {
        self.lock_state().history.undo_depth()
    }

    /// Apply one drag frame. The identical delta applies to every selected
    /// operation relative to its own gesture-start position, preserving
    /// relative offsets; the group never snaps to one absolute position.
    /// Resets the pending commit timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn drag_frame(self: &Arc<Self>, primary: &str, delta: DragDelta) {
        {
            let mut state = self.lock_state();
            if !state.selection.iter().any(|id| id == primary) {
                state.selection = vec![primary.to_string()];
            }
            if state.gesture_base.is_none() {
                state.gesture_base = Some(state.operations.clone());
            }
            let base = state
                .gesture_base
                .clone()
                .expect("gesture base present within open gesture");
            let equipment_ids = state
                .equipment
                .iter()
                .map(|eq| eq.id.clone())
                .collect::<Vec<_>>();

            for id in state.selection.clone() {
                let Some(base_op) = base.iter().find(|op| op.id == id) else {
                    continue;
                };
                let mut moved = base_op.clone();
                moved.shift(delta.time);
                if delta.row_shift != 0 {
                    if let Some(index) =
                        equipment_ids.iter().position(|eid| *eid == moved.equipment_id)
                    {
                        let last = equipment_ids.len() as i64 - 1;
                        let new_index = (index as i64 + delta.row_shift).clamp(0, last) as usize;
                        moved.equipment_id = equipment_ids[new_index].clone();
                    }
                }
                if let Some(index) = state.operation_index(&id) {
                    state.operations[index] = moved;
                }
            }
        }
        self.reset_debounce();
    }

    /// Commit any pending gesture right now instead of waiting out the quiet
    /// period (e.g. on shutdown).
    pub async fn flush(&self) {
        if let Some(handle) = self.pending.lock().expect("pending timer mutex poisoned").take() {
            handle.abort();
        }
        self.commit_gesture().await;
    }

    /// Resize one interval edge. Discrete per edge-release: records history
    /// and persists immediately, no debounce. Disabled for multi-selections.
    pub async fn resize(
        &self,
        id: &str,
        edge: ResizeEdge,
        time: DateTime<Utc>,
    ) -> Result<Operation, EngineError> {
        let updated = {
            let mut state = self.lock_state();
            if state.selection.len() > 1 {
                return Err(EngineError::ResizeWithMultiSelection);
            }
            let index = state
                .operation_index(id)
                .ok_or_else(|| EngineError::UnknownOperation(id.to_string()))?;
            let snapshot = state.operations.clone();
            state.history.record(snapshot);
            let op = &mut state.operations[index];
            match edge {
                ResizeEdge::Start => op.start_time = time,
                ResizeEdge::End => op.end_time = time,
            }
            op.clone()
        };
        let saved = self
            .provider
            .save_operation(OperationPatch::from_record(&updated))
            .await?;
        self.write_back(&saved);
        Ok(saved)
    }

    /// Duplicate the selected operations: fresh ids, fields copied, interval
    /// shifted by [`SyncConfig::duplicate_offset`], batch override applied.
    /// Persisted immediately; the new records become the selection.
    pub async fn duplicate_selection(
        &self,
        batch: BatchOverride,
    ) -> Result<Vec<Operation>, EngineError> {
        let clones = {
            let mut state = self.lock_state();
            let sources = state.selected_operations();
            if sources.is_empty() {
                return Ok(Vec::new());
            }
            let snapshot = state.operations.clone();
            state.history.record(snapshot);

            let now = Utc::now();
            let clones = sources
                .iter()
                .map(|source| {
                    let mut dup = source.clone();
                    dup.id = new_record_id();
                    dup.shift(self.config.duplicate_offset);
                    match &batch {
                        BatchOverride::Keep => {}
                        BatchOverride::Clear => dup.batch_id = None,
                        BatchOverride::Assign(batch_id) => {
                            dup.batch_id = Some(batch_id.clone())
                        }
                    }
                    dup.created_on = now;
                    dup.modified_on = now;
                    dup
                })
                .collect::<Vec<_>>();
            state.operations.extend(clones.iter().cloned());
            state.selection = clones.iter().map(|op| op.id.clone()).collect();
            clones
        };

        let results = join_all(
            clones
                .iter()
                .map(|op| self.provider.save_operation(OperationPatch::from_record(op))),
        )
        .await;
        for result in results {
            result?;
        }
        Ok(clones)
    }

    /// Delete every selected operation. Returns the number deleted.
    pub async fn delete_selection(&self) -> Result<usize, EngineError> {
        let ids = {
            let mut state = self.lock_state();
            if state.selection.is_empty() {
                return Ok(0);
            }
            let snapshot = state.operations.clone();
            state.history.record(snapshot);
            let ids = std::mem::take(&mut state.selection);
            state.operations.retain(|op| !ids.contains(&op.id));
            ids
        };
        for id in &ids {
            self.provider.delete_operation(id).await?;
        }
        Ok(ids.len())
    }

    /// Apply a field edit to an existing operation and persist it.
    pub async fn edit_operation(&self, patch: OperationPatch) -> Result<Operation, EngineError> {
        let id = patch.id.clone().ok_or(EngineError::PatchWithoutId)?;
        {
            let mut state = self.lock_state();
            state
                .operation_index(&id)
                .ok_or_else(|| EngineError::UnknownOperation(id.clone()))?;
            let snapshot = state.operations.clone();
            state.history.record(snapshot);
        }
        let saved = self.provider.save_operation(patch).await?;
        self.write_back(&saved);
        Ok(saved)
    }

    /// Create a new operation (double-click on empty canvas, or the explicit
    /// add action) and select it.
    pub async fn create_operation(
        &self,
        mut patch: OperationPatch,
    ) -> Result<Operation, EngineError> {
        patch.id = None;
        {
            let mut state = self.lock_state();
            let snapshot = state.operations.clone();
            state.history.record(snapshot);
        }
        let saved = self.provider.save_operation(patch).await?;
        let mut state = self.lock_state();
        state.operations.push(saved.clone());
        state.selection = vec![saved.id.clone()];
        Ok(saved)
    }

    /// Restore the previous snapshot and reconcile the store to it. Returns
    /// `false` when there is nothing to undo.
    pub async fn undo(&self) -> Result<bool, EngineError> {
        let (before, target) = {
            let mut state = self.lock_state();
            let Some(target) = state.history.pop_undo() else {
                return Ok(false);
            };
            let before = state.operations.clone();
            state.history.push_redo(before.clone());
            state.history.set_replaying(true);
            state.operations = target.clone();
            state.selection.retain(|id| target.iter().any(|op| op.id == *id));
            (before, target)
        };
        let result = self.reconcile(&before, &target).await;
        self.lock_state().history.set_replaying(false);
        result.map(|()| true)
    }

    /// Symmetric to [`SyncEngine::undo`].
    pub async fn redo(&self) -> Result<bool, EngineError> {
        let (before, target) = {
            let mut state = self.lock_state();
            let Some(target) = state.history.pop_redo() else {
                return Ok(false);
            };
            let before = state.operations.clone();
            state.history.push_undo(before.clone());
            state.history.set_replaying(true);
            state.operations = target.clone();
            state.selection.retain(|id| target.iter().any(|op| op.id == *id));
            (before, target)
        };
        let result = self.reconcile(&before, &target).await;
        self.lock_state().history.set_replaying(false);
        result.map(|()| true)
    }

    /// Diff `before` against `target` by id: ids gone from `target` are
    /// deleted; every `target` record is re-upserted, even unchanged ones.
    /// Always correct over minimal.
    async fn reconcile(
        &self,
        before: &[Operation],
        target: &[Operation],
    ) -> Result<(), EngineError> {
        for op in before {
            if !target.iter().any(|t| t.id == op.id) {
                self.provider.delete_operation(&op.id).await?;
            }
        }
        let results = join_all(
            target
                .iter()
                .map(|op| self.provider.save_operation(OperationPatch::from_record(op))),
        )
        .await;
        for result in results {
            result?;
        }
        Ok(())
    }

    fn reset_debounce(self: &Arc<Self>) {
        let mut pending = self.pending.lock().expect("pending timer mutex poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        let engine = Arc::clone(self);
        let delay = self.config.debounce;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            engine.commit_gesture().await;
        }));
    }

    /// Commit the open gesture: one history record for the whole gesture and
    /// one save per affected record, in parallel. Affected means changed
    /// against the gesture base, not currently selected: the selection may
    /// have moved on during the quiet period.
    async fn commit_gesture(&self) {
        let affected = {
            let mut state = self.lock_state();
            let Some(base) = state.gesture_base.take() else {
                return;
            };
            let affected = state
                .operations
                .iter()
                .filter(|op| {
                    base.iter()
                        .find(|base_op| base_op.id == op.id)
                        .map_or(true, |base_op| base_op != *op)
                })
                .cloned()
                .collect::<Vec<_>>();
            state.history.record(base);
            affected
        };
        if affected.is_empty() {
            return;
        }

        let results = join_all(
            affected
                .iter()
                .map(|op| self.provider.save_operation(OperationPatch::from_record(op))),
        )
        .await;
        let attempted = results.len();
        let failed = results.iter().filter(|result| result.is_err()).count();
        for err in results.into_iter().filter_map(|result| result.err()) {
            warn!(error = %err, "debounced operation save failed");
        }
        if failed > 0 {
            // In-memory state stays optimistic; no rollback on save failure.
            let _ = self
                .notifications
                .send(SyncNotification::SaveFailed { failed, attempted });
        }
    }

    fn write_back(&self, saved: &Operation) {
        let mut state = self.lock_state();
        if let Some(index) = state.operation_index(&saved.id) {
            state.operations[index] = saved.clone();
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BoardState> {
        self.state.lock().expect("board state mutex poisoned")
    }
}
