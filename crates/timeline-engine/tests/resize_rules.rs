use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use timeline_engine::{EngineError, ResizeEdge, SyncEngine};
use timeline_provider::{DataProvider, LocalDataProvider};
use timeline_store::RecordStore;

fn ts(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, 0, 0).unwrap()
}

async fn loaded_engine() -> (Arc<SyncEngine>, Arc<LocalDataProvider>) {
    let provider = Arc::new(LocalDataProvider::new(
        RecordStore::open_in_memory().expect("open"),
    ));
    let (engine, _notifications) = SyncEngine::new(provider.clone());
    engine
        .load(ts(1, 1, 0), ts(12, 31, 0))
        .await
        .expect("load");
    (engine, provider)
}

#[tokio::test]
async fn resize_is_rejected_while_multiple_operations_are_selected() {
    let (engine, provider) = loaded_engine().await;
    engine.set_selection(vec!["1".to_string(), "2".to_string()]);

    let err = engine
        .resize("1", ResizeEdge::End, ts(9, 4, 0))
        .await
        .expect_err("multi-selection must refuse to resize");
    assert!(matches!(err, EngineError::ResizeWithMultiSelection));

    // Neither memory nor the store moved.
    let stored = provider
        .get_operations(ts(8, 28, 0), ts(9, 3, 0))
        .await
        .expect("query");
    let op = stored.iter().find(|op| op.id == "1").expect("seeded op");
    assert_eq!(op.end_time, ts(9, 2, 12));
    assert!(!engine.can_undo());
}

#[tokio::test]
async fn resize_persists_immediately_and_is_undoable() {
    let (engine, provider) = loaded_engine().await;
    engine.set_selection(vec!["3".to_string()]);

    let new_end = ts(9, 3, 12);
    let saved = engine
        .resize("3", ResizeEdge::End, new_end)
        .await
        .expect("resize");
    assert_eq!(saved.end_time, new_end);

    // No debounce on edge release; the store reflects it right away.
    let stored = provider
        .get_operations(ts(9, 2, 0), ts(9, 4, 0))
        .await
        .expect("query");
    let op = stored.iter().find(|op| op.id == "3").expect("seeded op");
    assert_eq!(op.end_time, new_end);

    assert!(engine.can_undo());
    assert!(engine.undo().await.expect("undo"));
    let stored = provider
        .get_operations(ts(9, 2, 0), ts(9, 4, 0))
        .await
        .expect("query");
    let op = stored.iter().find(|op| op.id == "3").expect("seeded op");
    assert_eq!(op.end_time, ts(9, 3, 0));
}

#[tokio::test]
async fn resizing_an_unknown_operation_fails() {
    let (engine, _provider) = loaded_engine().await;
    let err = engine
        .resize("ghost", ResizeEdge::Start, ts(9, 1, 0))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, EngineError::UnknownOperation(id) if id == "ghost"));
}
