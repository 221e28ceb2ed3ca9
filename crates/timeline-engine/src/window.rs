use chrono::{DateTime, Utc};

use timeline_model::{Equipment, Operation};

use crate::state::BoardMode;

/// Wheel pixels per single-row scroll step.
pub const WHEEL_STEP_PX: f64 = 30.0;

/// Fraction of a row's height that must be free before the viewport gains an
/// extra (partially visible) row.
pub const EXTRA_ROW_FRACTION: f64 = 0.7;

/// Row/item id used for the placeholder injected when nothing is visible.
pub const PLACEHOLDER_ID: &str = "__placeholder__";

/// Viewport geometry, observed from the resize-sensitive host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMetrics {
    pub viewport_height: f64,
    pub header_height: f64,
    pub row_height: f64,
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self {
            viewport_height: 600.0,
            header_height: 60.0,
            row_height: 40.0,
        }
    }
}

/// One visible row slot handed to the chart widget.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSlot {
    Equipment(Equipment),
    /// Injected so the widget always has a non-empty group list.
    Placeholder,
}

impl RowSlot {
    pub fn row_id(&self) -> &str {
        match self {
            RowSlot::Equipment(eq) => &eq.id,
            RowSlot::Placeholder => PLACEHOLDER_ID,
        }
    }
}

/// One visible item slot handed to the chart widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSlot {
    pub id: String,
    pub row_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub placeholder: bool,
}

impl ItemSlot {
    fn from_operation(op: &Operation) -> Self {
        Self {
            id: op.id.clone(),
            row_id: op.equipment_id.clone(),
            start: op.start_time,
            end: op.end_time,
            placeholder: false,
        }
    }

    fn placeholder(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: PLACEHOLDER_ID.to_string(),
            row_id: PLACEHOLDER_ID.to_string(),
            start,
            end,
            placeholder: true,
        }
    }
}

/// The windowed slice of rows and items for the current scroll position.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedView {
    pub rows: Vec<RowSlot>,
    pub items: Vec<ItemSlot>,
    /// Offset into the filtered row list that the view was produced at
    /// (after clamping).
    pub offset: usize,
    /// Total filtered rows, before windowing.
    pub total_rows: usize,
}

/// Maps scroll/drag input to an offset into the (possibly filtered) row
/// list, rendering only as many rows as fit the viewport.
///
/// Independent of persistence: consumes only the current row list and
/// viewport geometry.
#[derive(Debug, Clone)]
pub struct WindowController {
    row_height: f64,
    rows_per_page: usize,
    offset: usize,
    total_rows: usize,
    wheel_accum: f64,
    /// `(pointer_y, offset)` captured at drag start; drags apply relative to
    /// this anchor, not incrementally per frame.
    drag_anchor: Option<(f64, usize)>,
}

impl WindowController {
    pub fn new(metrics: WindowMetrics) -> Self {
        let mut controller = Self {
            row_height: metrics.row_height,
            rows_per_page: 0,
            offset: 0,
            total_rows: 0,
            wheel_accum: 0.0,
            drag_anchor: None,
        };
        controller.set_metrics(metrics);
        controller
    }

    /// Recompute the page size after a viewport resize, then re-clamp.
    pub fn set_metrics(&mut self, metrics: WindowMetrics) {
        self.row_height = metrics.row_height;
        self.rows_per_page = rows_per_page(&metrics);
        self.clamp();
    }

    /// Re-clamp after the underlying (filtered) row count changes.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.clamp();
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
        self.clamp();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Accumulate a wheel delta; every time the running counter crosses
    /// [`WHEEL_STEP_PX`] in either direction the offset moves one row and the
    /// threshold is subtracted back out, converting variable-granularity
    /// wheel events into consistent single-row steps.
    pub fn wheel(&mut self, delta_y: f64) {
        self.wheel_accum += delta_y;
        while self.wheel_accum >= WHEEL_STEP_PX {
            self.offset = self.offset.saturating_add(1);
            self.wheel_accum -= WHEEL_STEP_PX;
        }
        while self.wheel_accum <= -WHEEL_STEP_PX {
            self.offset = self.offset.saturating_sub(1);
            self.wheel_accum += WHEEL_STEP_PX;
        }
        self.clamp();
    }

    /// Begin a pointer drag on empty canvas.
    pub fn drag_start(&mut self, pointer_y: f64) {
        self.drag_anchor = Some((pointer_y, self.offset));
    }

    /// Update the offset from the current pointer position. Displacement
    /// maps to rows by integer division against the row height, relative to
    /// the anchored start offset; dragging down reveals earlier rows.
    pub fn drag_move(&mut self, pointer_y: f64) {
        let Some((anchor_y, anchor_offset)) = self.drag_anchor else {
            return;
        };
        if self.row_height <= 0.0 {
            return;
        }
        let row_delta = ((pointer_y - anchor_y) / self.row_height) as i64;
        let next = anchor_offset as i64 - row_delta;
        self.offset = next.clamp(0, i64::MAX) as usize;
        self.clamp();
    }

    pub fn drag_end(&mut self) {
        self.drag_anchor = None;
    }

    /// Produce the visible rows and items for the chart widget.
    ///
    /// In view mode, rows with no items intersecting `[window_start,
    /// window_end]` are hidden before windowing; the offset operates on the
    /// filtered list. A placeholder row/item pair spanning the window is
    /// injected whenever the windowed set yields zero visible items.
    pub fn view(
        &mut self,
        equipment: &[Equipment],
        operations: &[Operation],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        mode: BoardMode,
    ) -> WindowedView {
        let candidates = equipment
            .iter()
            .filter(|eq| {
                mode == BoardMode::Edit
                    || operations.iter().any(|op| {
                        op.equipment_id == eq.id && op.overlaps(window_start, window_end)
                    })
            })
            .cloned()
            .collect::<Vec<_>>();

        self.set_total_rows(candidates.len());

        let page_end = (self.offset + self.rows_per_page).min(candidates.len());
        let page = &candidates[self.offset.min(candidates.len())..page_end];

        let mut rows = page
            .iter()
            .cloned()
            .map(RowSlot::Equipment)
            .collect::<Vec<_>>();
        let mut items = operations
            .iter()
            .filter(|op| {
                op.overlaps(window_start, window_end)
                    && page.iter().any(|eq| eq.id == op.equipment_id)
            })
            .map(ItemSlot::from_operation)
            .collect::<Vec<_>>();

        if items.is_empty() {
            rows.push(RowSlot::Placeholder);
            items.push(ItemSlot::placeholder(window_start, window_end));
        }

        WindowedView {
            rows,
            items,
            offset: self.offset,
            total_rows: candidates.len(),
        }
    }

    fn clamp(&mut self) {
        let max = self.total_rows.saturating_sub(self.rows_per_page);
        if self.offset > max {
            self.offset = max;
        }
    }
}

/// Rows that fit the usable viewport height, with a partially visible extra
/// row once more than [`EXTRA_ROW_FRACTION`] of a row's height is free.
fn rows_per_page(metrics: &WindowMetrics) -> usize {
    if metrics.row_height <= 0.0 {
        return 0;
    }
    let usable = (metrics.viewport_height - metrics.header_height).max(0.0);
    let full = (usable / metrics.row_height).floor();
    let leftover = usable - full * metrics.row_height;
    let extra = usize::from(leftover > EXTRA_ROW_FRACTION * metrics.row_height);
    full as usize + extra
}
