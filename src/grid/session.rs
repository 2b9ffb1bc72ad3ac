//! Drag and resize gesture controller.
//!
//! DESIGN
//! ======
//! A `DragSession` lives from pointer-down to pointer-up. Each `frame`
//! converts the pointer position into a candidate cell, asks the resolver for
//! a verdict against the current layout, and returns ghost rectangles for the
//! renderer. Nothing is mutated until `finish`, which yields at most one
//! [`Commit`]. Dropping a session is the cancel path.
//!
//! Pixel geometry comes from the client: the grid's bounding box and the
//! pointer, both in viewport pixels. Cell sizes fall back to 100px when the
//! grid reports no size (hidden or not yet laid out).
//!
//! EDGE CASES
//! ==========
//! - A frame for a widget that no longer exists yields no preview.
//! - A resize that would spill past the grid edge is clamped to the edge.
//! - A resize whose area is occupied keeps the last accepted size.
//! - `finish` re-resolves against the layout at drop time, so a drop never
//!   commits a stale verdict.

use serde::{Deserialize, Serialize};

use super::model::{GridModel, GridSize, ItemId, LayoutViolation, Placeable, Placed, Rect, validate_layout};
use super::resolver::{MoveResult, resolve_move};

/// Cell edge used when the grid has no measurable pixel size.
pub const FALLBACK_CELL_PX: f64 = 100.0;

// =============================================================================
// PIXEL GEOMETRY
// =============================================================================

/// Pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of the rendered grid in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl GridMetrics {
    /// Width and height of one cell.
    #[must_use]
    pub fn cell_size(&self, size: GridSize) -> (f64, f64) {
        let cell = |span: f64, count: i32| {
            if span > 0.0 && count > 0 { span / f64::from(count) } else { FALLBACK_CELL_PX }
        };
        (cell(self.width, size.cols), cell(self.height, size.rows))
    }

    /// Pixel top-left of a 1-based grid cell.
    #[must_use]
    pub fn cell_origin(&self, size: GridSize, x: i32, y: i32) -> Point {
        let (cell_w, cell_h) = self.cell_size(size);
        Point::new(self.left + f64::from(x - 1) * cell_w, self.top + f64::from(y - 1) * cell_h)
    }
}

/// Round half up to a whole cell count, saturating at the `i32` range.
#[allow(clippy::cast_possible_truncation)]
fn round_cells(value: f64) -> i32 {
    let rounded = (value + 0.5).floor();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

// =============================================================================
// PREVIEW
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostStyle {
    Valid,
    Displaced,
    Invalid,
}

/// One outline the renderer draws during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ghost {
    #[serde(flatten)]
    pub rect: Rect,
    pub style: GhostStyle,
}

/// Per-frame output of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub ghosts: Vec<Ghost>,
    /// Resolver verdict for move gestures; `None` while resizing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MoveResult>,
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone)]
enum Gesture {
    Move {
        /// Pointer offset from the card's top-left at grab time.
        grab: Point,
        target: Option<(i32, i32)>,
    },
    Resize {
        start: Point,
        origin: Rect,
        accepted: Rect,
    },
}

/// One in-flight drag or resize gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    source_id: ItemId,
    metrics: GridMetrics,
    gesture: Gesture,
}

impl DragSession {
    /// Start moving `source`, grabbed at `pointer`.
    #[must_use]
    pub fn begin_move(source: Placed, pointer: Point, metrics: GridMetrics, size: GridSize) -> Self {
        let card = metrics.cell_origin(size, source.rect.x, source.rect.y);
        let grab = Point::new(pointer.x - card.x, pointer.y - card.y);
        Self { source_id: source.id, metrics, gesture: Gesture::Move { grab, target: None } }
    }

    /// Start resizing `source` from its bottom-right handle.
    #[must_use]
    pub fn begin_resize(source: Placed, pointer: Point, metrics: GridMetrics) -> Self {
        Self {
            source_id: source.id,
            metrics,
            gesture: Gesture::Resize { start: pointer, origin: source.rect, accepted: source.rect },
        }
    }

    #[must_use]
    pub fn source_id(&self) -> ItemId {
        self.source_id
    }

    #[must_use]
    pub fn mode(&self) -> DragMode {
        match self.gesture {
            Gesture::Move { .. } => DragMode::Move,
            Gesture::Resize { .. } => DragMode::Resize,
        }
    }

    /// Process one pointer sample. `None` if the source widget is gone.
    pub fn frame(&mut self, model: &GridModel, pointer: Point) -> Option<Preview> {
        let source = model.item(self.source_id)?;
        let size = model.size();
        let (cell_w, cell_h) = self.metrics.cell_size(size);

        match &mut self.gesture {
            Gesture::Move { grab, target } => {
                let raw_x = pointer.x - grab.x - self.metrics.left;
                let raw_y = pointer.y - grab.y - self.metrics.top;
                let x = round_cells(raw_x / cell_w).saturating_add(1);
                let y = round_cells(raw_y / cell_h).saturating_add(1);
                *target = Some((x, y));

                let result = resolve_move(model, &source, x, y);
                Some(Preview { ghosts: move_ghosts(source, &result), result: Some(result) })
            }
            Gesture::Resize { start, origin, accepted } => {
                let cols = origin.cols.saturating_add(round_cells((pointer.x - start.x) / cell_w));
                let rows = origin.rows.saturating_add(round_cells((pointer.y - start.y) / cell_h));
                let candidate = clamp_resize(source.rect, size, cols, rows);
                if model.is_area_free(candidate.x, candidate.y, candidate.cols, candidate.rows, Some(source.id)) {
                    *accepted = candidate;
                }
                Some(Preview { ghosts: vec![Ghost { rect: *accepted, style: GhostStyle::Valid }], result: None })
            }
        }
    }

    /// End the gesture. `None` means snap back with no change.
    #[must_use]
    pub fn finish(self, model: &GridModel) -> Option<Commit> {
        let source = model.item(self.source_id)?;

        match self.gesture {
            Gesture::Move { target, .. } => {
                let (x, y) = target?;
                Commit::from_verdict(source, &resolve_move(model, &source, x, y))
            }
            Gesture::Resize { accepted, .. } => {
                let resized = Rect { cols: accepted.cols, rows: accepted.rows, ..source.rect };
                let free = model.size().contains(resized)
                    && model.is_area_free(resized.x, resized.y, resized.cols, resized.rows, Some(source.id));
                (free && resized != source.rect).then(|| Commit { changes: vec![Change { id: source.id, rect: resized }] })
            }
        }
    }
}

fn move_ghosts(source: Placed, result: &MoveResult) -> Vec<Ghost> {
    match result.target() {
        Some((x, y)) => {
            let mut ghosts = Vec::with_capacity(1 + result.displaced().len());
            ghosts.push(Ghost { rect: source.rect.at(x, y), style: GhostStyle::Valid });
            ghosts.extend(result.displaced().iter().map(|d| Ghost { rect: d.rect(), style: GhostStyle::Displaced }));
            ghosts
        }
        None => vec![Ghost { rect: source.rect, style: GhostStyle::Invalid }],
    }
}

/// Resize `origin` to at least 1x1, clipped so it ends on the grid edge.
#[must_use]
pub fn clamp_resize(origin: Rect, size: GridSize, cols: i32, rows: i32) -> Rect {
    let fit = |start: i32, want: i32, limit: i32| -> i32 {
        let room = i64::from(limit) - i64::from(start) + 1;
        let want = i64::from(want.max(1));
        i32::try_from(want.min(room).max(1)).unwrap_or(1)
    };
    Rect { cols: fit(origin.x, cols, size.cols), rows: fit(origin.y, rows, size.rows), ..origin }
}

// =============================================================================
// COMMIT
// =============================================================================

/// One rectangle rewrite inside a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Change {
    pub id: ItemId,
    pub rect: Rect,
}

/// The batch of rewrites a gesture produces, applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Commit {
    pub changes: Vec<Change>,
}

impl Commit {
    /// Source at the resolved target plus every displaced item, or `None`
    /// for a rejected verdict.
    #[must_use]
    pub fn from_verdict(source: Placed, result: &MoveResult) -> Option<Self> {
        let (x, y) = result.target()?;
        let mut changes = vec![Change { id: source.id, rect: source.rect.at(x, y) }];
        changes.extend(result.displaced().iter().map(|d| Change { id: d.id, rect: d.rect() }));
        Some(Self { changes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    #[error("commit references unknown item {0}")]
    UnknownItem(ItemId),
    #[error("commit would break the layout: {0}")]
    Violation(#[from] LayoutViolation),
}

/// Apply `commit` to `items` as one batch. The resulting layout is validated
/// in full before anything is written; on error `items` is untouched.
///
/// # Errors
///
/// Returns [`CommitError`] if a change names a missing item or the new layout
/// breaks an invariant.
pub fn apply_commit<T: Placeable>(size: GridSize, items: &mut [T], commit: &Commit) -> Result<(), CommitError> {
    let mut next: Vec<Placed> = items.iter().map(Placed::of).collect();

    for change in &commit.changes {
        let slot = next.iter_mut().find(|p| p.id == change.id).ok_or(CommitError::UnknownItem(change.id))?;
        slot.rect = change.rect;
    }

    validate_layout(size, &next)?;

    for (item, placed) in items.iter_mut().zip(&next) {
        if item.rect() != placed.rect {
            item.place(placed.rect);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
