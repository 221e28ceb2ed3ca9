use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use timeline_engine::{BatchOverride, BoardMode, Command, CommandOutcome, SyncEngine};
use timeline_model::OperationPatch;
use timeline_provider::LocalDataProvider;
use timeline_store::RecordStore;

async fn loaded_engine() -> Arc<SyncEngine> {
    let provider = Arc::new(LocalDataProvider::new(
        RecordStore::open_in_memory().expect("open"),
    ));
    let (engine, _notifications) = SyncEngine::new(provider);
    engine
        .load(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
        .await
        .expect("load");
    engine
}

#[tokio::test]
async fn view_mode_ignores_every_mutating_command() {
    let engine = loaded_engine().await;
    let created = engine
        .create_operation(OperationPatch {
            equipment_id: Some("1".to_string()),
            ..OperationPatch::default()
        })
        .await
        .expect("create");
    let before = engine.operations();

    engine.set_mode(BoardMode::View);
    assert!(engine.can_undo(), "history exists but view mode gates it");
    assert_eq!(
        engine.dispatch(Command::Undo).await.expect("dispatch"),
        CommandOutcome::Ignored
    );
    assert_eq!(
        engine
            .dispatch(Command::DeleteSelection)
            .await
            .expect("dispatch"),
        CommandOutcome::Ignored
    );
    assert_eq!(
        engine
            .dispatch(Command::DuplicateSelection(BatchOverride::Keep))
            .await
            .expect("dispatch"),
        CommandOutcome::Ignored
    );
    assert_eq!(engine.operations(), before, "nothing mutated");

    // Back in edit mode the same delete goes through.
    engine.set_mode(BoardMode::Edit);
    assert_eq!(
        engine
            .dispatch(Command::DeleteSelection)
            .await
            .expect("dispatch"),
        CommandOutcome::Applied
    );
    assert!(engine.operations().iter().all(|op| op.id != created.id));
}

#[tokio::test]
async fn commands_with_nothing_to_act_on_are_ignored() {
    let engine = loaded_engine().await;
    for command in [
        Command::Undo,
        Command::Redo,
        Command::DeleteSelection,
        Command::DuplicateSelection(BatchOverride::Keep),
    ] {
        assert_eq!(
            engine.dispatch(command).await.expect("dispatch"),
            CommandOutcome::Ignored
        );
    }
}
