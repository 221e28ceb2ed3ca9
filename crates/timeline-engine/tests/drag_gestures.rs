use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use timeline_engine::{DragDelta, SyncEngine};
use timeline_model::{Operation, OperationPatch};
use timeline_provider::{DataProvider, LocalDataProvider};
use timeline_store::RecordStore;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, 1, hour, 0, 0).unwrap()
}

async fn loaded_engine() -> (Arc<SyncEngine>, Arc<LocalDataProvider>) {
    let provider = Arc::new(LocalDataProvider::new(
        RecordStore::open_in_memory().expect("open"),
    ));
    let (engine, _notifications) = SyncEngine::new(provider.clone());
    engine
        .load(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2032, 1, 1, 0, 0, 0).unwrap(),
        )
        .await
        .expect("load");
    (engine, provider)
}

fn find<'a>(ops: &'a [Operation], id: &str) -> &'a Operation {
    ops.iter().find(|op| op.id == id).expect("operation present")
}

#[tokio::test(start_paused = true)]
async fn group_drag_preserves_relative_offsets_and_commits_once() {
    let (engine, provider) = loaded_engine().await;

    let a = engine
        .create_operation(OperationPatch {
            equipment_id: Some("1".to_string()),
            start_time: Some(at(10)),
            end_time: Some(at(12)),
            ..OperationPatch::default()
        })
        .await
        .expect("create a");
    let b = engine
        .create_operation(OperationPatch {
            equipment_id: Some("2".to_string()),
            start_time: Some(at(11)),
            end_time: Some(at(13)),
            ..OperationPatch::default()
        })
        .await
        .expect("create b");
    engine.set_selection(vec![a.id.clone(), b.id.clone()]);
    let depth = engine.undo_depth();

    // Every frame carries the delta from the gesture start, not from the
    // previous frame.
    for hours in [1, 2, 4] {
        engine.drag_frame(
            &a.id,
            DragDelta {
                time: chrono::Duration::hours(hours),
                row_shift: 0,
            },
        );
    }

    let ops = engine.operations();
    assert_eq!(find(&ops, &a.id).start_time, at(14));
    assert_eq!(find(&ops, &a.id).end_time, at(16));
    // B moved by the same delta, keeping its one-hour offset from A.
    assert_eq!(find(&ops, &b.id).start_time, at(15));
    assert_eq!(find(&ops, &b.id).end_time, at(17));

    // Inside the quiet period nothing has been persisted yet.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let stored = provider
        .get_operations(at(0), at(23))
        .await
        .expect("query");
    assert_eq!(find(&stored, &a.id).start_time, at(10));

    // Once the debounce elapses the whole gesture commits at once.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let stored = provider
        .get_operations(at(0), at(23))
        .await
        .expect("query");
    assert_eq!(find(&stored, &a.id).start_time, at(14));
    assert_eq!(find(&stored, &b.id).start_time, at(15));
    assert_eq!(find(&stored, &b.id).end_time, at(17));
    assert_eq!(engine.undo_depth(), depth + 1, "one snapshot per gesture");

    assert!(engine.undo().await.expect("undo"));
    let ops = engine.operations();
    assert_eq!(find(&ops, &a.id).start_time, at(10));
    assert_eq!(find(&ops, &b.id).start_time, at(11));
    let stored = provider
        .get_operations(at(0), at(23))
        .await
        .expect("query");
    assert_eq!(find(&stored, &a.id).start_time, at(10));
}

#[tokio::test(start_paused = true)]
async fn selection_changes_inside_the_quiet_period_do_not_lose_the_gesture() {
    let (engine, provider) = loaded_engine().await;
    let window_start = Utc.with_ymd_and_hms(2025, 8, 28, 0, 0, 0).unwrap();
    let window_end = Utc.with_ymd_and_hms(2025, 9, 3, 0, 0, 0).unwrap();

    let before = provider
        .get_operations(window_start, window_end)
        .await
        .expect("query");
    let untouched_stamp = find(&before, "2").modified_on;

    // Seeded operation "1" starts Aug 28 00:00.
    engine.drag_frame(
        "1",
        DragDelta {
            time: chrono::Duration::hours(6),
            row_shift: 0,
        },
    );

    // The user clicks another record before the debounce fires.
    tokio::time::sleep(Duration::from_millis(100)).await;
    engine.set_selection(vec!["2".to_string()]);
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The dragged record is committed regardless of the current selection.
    let stored = provider
        .get_operations(window_start, window_end)
        .await
        .expect("query");
    assert_eq!(
        find(&stored, "1").start_time,
        Utc.with_ymd_and_hms(2025, 8, 28, 6, 0, 0).unwrap()
    );
    // The newly selected, untouched record was not part of the commit.
    assert_eq!(find(&stored, "2").modified_on, untouched_stamp);

    // The gesture stays undoable as one step.
    assert!(engine.undo().await.expect("undo"));
    let stored = provider
        .get_operations(window_start, window_end)
        .await
        .expect("query");
    assert_eq!(find(&stored, "1").start_time, window_start);
}

#[tokio::test(start_paused = true)]
async fn drag_selects_the_primary_and_clamps_row_shifts() {
    let (engine, provider) = loaded_engine().await;

    // Seeded operation "2" sits on equipment "7" (display row 6).
    engine.drag_frame(
        "2",
        DragDelta {
            time: chrono::Duration::zero(),
            row_shift: 2,
        },
    );
    assert_eq!(engine.selection(), vec!["2".to_string()]);
    assert_eq!(find(&engine.operations(), "2").equipment_id, "9");

    // Shifts past the last row clamp instead of falling off the board.
    engine.drag_frame(
        "2",
        DragDelta {
            time: chrono::Duration::zero(),
            row_shift: 100,
        },
    );
    assert_eq!(find(&engine.operations(), "2").equipment_id, "11");

    engine.flush().await;
    let stored = provider
        .get_operations(
            Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 9, 3, 0, 0, 0).unwrap(),
        )
        .await
        .expect("query");
    assert_eq!(find(&stored, "2").equipment_id, "11");
}
