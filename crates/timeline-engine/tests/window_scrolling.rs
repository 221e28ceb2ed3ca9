use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use timeline_engine::{
    BoardMode, RowSlot, WindowController, WindowMetrics, PLACEHOLDER_ID,
};
use timeline_model::{Equipment, Operation, OwnerInfo};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 3, 1, hour, 0, 0).unwrap()
}

fn equipment(id: &str, sort_order: i64) -> Equipment {
    Equipment {
        id: id.to_string(),
        tag: format!("T-{id}"),
        description: String::new(),
        tag_and_description: format!("T-{id}"),
        sort_order,
        created_on: at(0),
        modified_on: at(0),
        owner: OwnerInfo::default(),
        state_code: "0".to_string(),
    }
}

fn operation(id: &str, equipment_id: &str, start: u32, end: u32) -> Operation {
    Operation {
        id: id.to_string(),
        equipment_id: equipment_id.to_string(),
        batch_id: None,
        start_time: at(start),
        end_time: at(end),
        kind: "Production".to_string(),
        description: String::new(),
        created_on: at(0),
        modified_on: at(0),
        state_code: "0".to_string(),
        status_code: "0".to_string(),
    }
}

// 60px header + 10 rows of 40px exactly.
fn ten_row_metrics() -> WindowMetrics {
    WindowMetrics {
        viewport_height: 460.0,
        header_height: 60.0,
        row_height: 40.0,
    }
}

#[test]
fn offset_clamps_to_the_row_count() {
    let mut controller = WindowController::new(ten_row_metrics());
    controller.set_total_rows(100);

    controller.set_offset(1000);
    assert_eq!(controller.offset(), 90, "last full page");

    // Fewer rows than a page: no scrolling at all.
    controller.set_total_rows(5);
    assert_eq!(controller.offset(), 0);
}

#[test]
fn wheel_deltas_accumulate_into_row_steps() {
    let mut controller = WindowController::new(ten_row_metrics());
    controller.set_total_rows(100);

    controller.wheel(45.0);
    assert_eq!(controller.offset(), 1, "one 30px step, 15px carried over");
    controller.wheel(20.0);
    assert_eq!(controller.offset(), 2, "carry-over pushed it past a step");
    controller.wheel(-70.0);
    assert_eq!(controller.offset(), 0, "two steps back");
    controller.wheel(25.0);
    assert_eq!(controller.offset(), 0, "below threshold, nothing moves");
}

#[test]
fn pointer_drags_map_displacement_to_rows_from_the_anchor() {
    let mut controller = WindowController::new(ten_row_metrics());
    controller.set_total_rows(100);
    controller.set_offset(50);

    controller.drag_start(500.0);
    // Dragging up by two rows reveals later rows.
    controller.drag_move(420.0);
    assert_eq!(controller.offset(), 52);
    // Each move is relative to the anchor, not the previous position.
    controller.drag_move(585.0);
    assert_eq!(controller.offset(), 48);
    controller.drag_end();

    // Moves after release are ignored.
    controller.drag_move(100.0);
    assert_eq!(controller.offset(), 48);
}

#[test]
fn view_mode_hides_rows_without_visible_work() {
    let mut controller = WindowController::new(ten_row_metrics());
    let rows = vec![equipment("1", 0), equipment("2", 1), equipment("3", 2)];
    let ops = vec![operation("a", "2", 9, 11)];

    let edit = controller.view(&rows, &ops, at(8), at(18), BoardMode::Edit);
    assert_eq!(edit.total_rows, 3);
    assert_eq!(edit.rows.len(), 3);

    let view = controller.view(&rows, &ops, at(8), at(18), BoardMode::View);
    assert_eq!(view.total_rows, 1);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].row_id(), "2");
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].id, "a");
}

#[test]
fn placeholder_keeps_the_widget_populated() {
    let mut controller = WindowController::new(ten_row_metrics());
    let rows = vec![equipment("1", 0)];
    // The only operation sits outside the visible time window.
    let ops = vec![operation("a", "1", 1, 2)];

    let view = controller.view(&rows, &ops, at(8), at(18), BoardMode::View);
    assert_eq!(view.total_rows, 0);
    assert_eq!(view.rows, vec![RowSlot::Placeholder]);
    assert_eq!(view.items.len(), 1);
    let item = &view.items[0];
    assert!(item.placeholder);
    assert_eq!(item.id, PLACEHOLDER_ID);
    assert_eq!(item.start, at(8));
    assert_eq!(item.end, at(18));

    // Edit mode keeps the empty rows but still needs a placeholder item.
    let edit = controller.view(&rows, &ops, at(8), at(18), BoardMode::Edit);
    assert_eq!(edit.rows.len(), 2, "real row plus the placeholder");
    assert!(edit.items.iter().all(|item| item.placeholder));
}
