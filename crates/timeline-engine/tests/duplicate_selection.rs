use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use timeline_engine::{BatchOverride, SyncEngine};
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
async fn duplicates_shift_one_day_and_take_the_batch_override() {
    let (engine, provider) = loaded_engine().await;

    // Seeded operation "1": equipment "1", batch 25-HTS-30, Aug 28 – Sep 2 12:00.
    engine.set_selection(vec!["1".to_string()]);
    let clones = engine
        .duplicate_selection(BatchOverride::Assign("25-HTS-31".to_string()))
        .await
        .expect("duplicate");

    assert_eq!(clones.len(), 1);
    let clone = &clones[0];
    assert_ne!(clone.id, "1");
    assert_eq!(clone.equipment_id, "1");
    assert_eq!(clone.start_time, ts(8, 29, 0));
    assert_eq!(clone.end_time, ts(9, 3, 12));
    assert_eq!(clone.batch_id.as_deref(), Some("25-HTS-31"));

    // The clones become the selection, ready for a follow-up drag.
    assert_eq!(engine.selection(), vec![clone.id.clone()]);

    let stored = provider
        .get_operations(ts(8, 29, 0), ts(8, 30, 0))
        .await
        .expect("query");
    assert!(stored.iter().any(|op| op.id == clone.id));

    // The duplication is one undoable step.
    assert!(engine.undo().await.expect("undo"));
    assert!(engine.operations().iter().all(|op| op.id != clone.id));
    let stored = provider
        .get_operations(ts(8, 29, 0), ts(8, 30, 0))
        .await
        .expect("query");
    assert!(stored.iter().all(|op| op.id != clone.id));
}

#[tokio::test]
async fn clear_and_keep_overrides_control_the_batch_attribution() {
    let (engine, _provider) = loaded_engine().await;

    engine.set_selection(vec!["2".to_string()]);
    let cleared = engine
        .duplicate_selection(BatchOverride::Clear)
        .await
        .expect("duplicate");
    assert_eq!(cleared[0].batch_id, None);

    engine.set_selection(vec!["3".to_string()]);
    let kept = engine
        .duplicate_selection(BatchOverride::Keep)
        .await
        .expect("duplicate");
    assert_eq!(kept[0].batch_id.as_deref(), Some("25-HTS-30"));
}

#[tokio::test]
async fn duplicating_an_empty_selection_is_a_no_op() {
    let (engine, _provider) = loaded_engine().await;
    let clones = engine
        .duplicate_selection(BatchOverride::Keep)
        .await
        .expect("duplicate");
    assert!(clones.is_empty());
    assert!(!engine.can_undo(), "no snapshot for a no-op");
}
