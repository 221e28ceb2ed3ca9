use crate::state::BoardMode;
use crate::sync::{BatchOverride, EngineError, SyncEngine};

/// Keyboard-driven actions, dispatched explicitly against the engine's
/// authoritative selection/mode state rather than through window-level
/// listeners closing over stale component state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Undo,
    Redo,
    DeleteSelection,
    DuplicateSelection(BatchOverride),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// The command did not apply in the current mode/selection state.
    Ignored,
}

impl SyncEngine {
    pub async fn dispatch(&self, command: Command) -> Result<CommandOutcome, EngineError> {
        // View mode is read-only: every command here mutates.
        if self.mode() == BoardMode::View {
            return Ok(CommandOutcome::Ignored);
        }
        match command {
            Command::Undo => {
                if self.undo().await? {
                    Ok(CommandOutcome::Applied)
                } else {
                    Ok(CommandOutcome::Ignored)
                }
            }
            Command::Redo => {
                if self.redo().await? {
                    Ok(CommandOutcome::Applied)
                } else {
                    Ok(CommandOutcome::Ignored)
                }
            }
            Command::DeleteSelection => {
                if self.delete_selection().await? > 0 {
                    Ok(CommandOutcome::Applied)
                } else {
                    Ok(CommandOutcome::Ignored)
                }
            }
            Command::DuplicateSelection(batch) => {
                if self.duplicate_selection(batch).await?.is_empty() {
                    Ok(CommandOutcome::Ignored)
                } else {
                    Ok(CommandOutcome::Applied)
                }
            }
        }
    }
}
