//! Layout service: widget CRUD, moves, resizes, drag sessions, and grid
//! settings.
//!
//! DESIGN
//! ======
//! Every operation takes the dashboard lock exactly once. Reads build a fresh
//! `GridModel` from the widget list; writes go through `apply_commit`, which
//! validates the whole resulting layout before touching any widget. A
//! successful mutation bumps the dashboard revision so the persistence task
//! picks it up.
//!
//! EDGE CASES
//! ==========
//! - Deleting a widget cancels every drag session on it.
//! - Starting a gesture drops any earlier session the client never closed.
//! - A drag frame for a widget deleted mid-gesture drops the session.
//! - Shrinking the grid is refused while any widget would fall outside it.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::grid::model::LayoutViolation;
use crate::grid::resolver::resolve_move;
use crate::grid::session::{Change, CommitError, clamp_resize};
use crate::grid::{
    Commit, DragMode, DragSession, GridItem, GridMetrics, GridSize, ItemId, MoveResult, Placed, Point, Preview, apply_commit,
};
use crate::state::{AppState, DashboardState, Settings, Widget, is_valid_grid_size};
use crate::widgets::WidgetKind;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("widget not found: {0}")]
    WidgetNotFound(ItemId),
    #[error("drag session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("no free {cols}x{rows} slot on the grid")]
    GridFull { cols: i32, rows: i32 },
    #[error("widget {id} would fall outside a {cols}x{rows} grid")]
    GridTooSmall { id: ItemId, cols: i32, rows: i32 },
    #[error("grid size {cols}x{rows} is out of range")]
    InvalidGridSize { cols: i32, rows: i32 },
    #[error("resize of widget {0} is blocked by another widget")]
    ResizeBlocked(ItemId),
    #[error("invalid layout: {0}")]
    Invalid(#[from] LayoutViolation),
}

impl From<CommitError> for LayoutError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::UnknownItem(id) => Self::WidgetNotFound(id),
            CommitError::Violation(violation) => Self::Invalid(violation),
        }
    }
}

impl ErrorCode for LayoutError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WidgetNotFound(_) => "E_WIDGET_NOT_FOUND",
            Self::SessionNotFound(_) => "E_SESSION_NOT_FOUND",
            Self::GridFull { .. } => "E_GRID_FULL",
            Self::GridTooSmall { .. } => "E_GRID_TOO_SMALL",
            Self::InvalidGridSize { .. } => "E_INVALID_GRID_SIZE",
            Self::ResizeBlocked(_) => "E_RESIZE_BLOCKED",
            Self::Invalid(_) => "E_INVALID_LAYOUT",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::WidgetNotFound(_) | Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::GridFull { .. } | Self::GridTooSmall { .. } | Self::ResizeBlocked(_) | Self::Invalid(_) => {
                StatusCode::CONFLICT
            }
            Self::InvalidGridSize { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

/// Full layout as the renderer needs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub columns: i32,
    pub rows: i32,
    pub revision: u64,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewWidget {
    #[serde(rename = "subtype")]
    pub kind: WidgetKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Partial widget update. `data` keys are merged shallowly; a `null` value
/// removes the key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WidgetPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginDrag {
    pub widget_id: ItemId,
    pub mode: DragMode,
    pub pointer: Point,
    pub metrics: GridMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragStarted {
    pub session_id: Uuid,
    pub widget_id: ItemId,
    pub mode: DragMode,
}

/// Result of ending a gesture. An empty change list means snap back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragOutcome {
    pub committed: bool,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    #[serde(default)]
    pub grid_columns: Option<i32>,
    #[serde(default)]
    pub grid_rows: Option<i32>,
    /// Opaque theme keys; `null` removes a key.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub theme: Option<ThemePatch>,
    #[serde(rename = "custom_presets", alias = "customPresets", default)]
    pub custom_presets: Option<Map<String, Value>>,
}

// =============================================================================
// READ
// =============================================================================

pub async fn snapshot(state: &AppState) -> LayoutSnapshot {
    let dashboard = state.dashboard.read().await;
    snapshot_of(&dashboard)
}

pub(crate) fn snapshot_of(dashboard: &DashboardState) -> LayoutSnapshot {
    let size = dashboard.grid_size();
    LayoutSnapshot { columns: size.cols, rows: size.rows, revision: dashboard.revision, widgets: dashboard.widgets.clone() }
}

/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn get_widget(state: &AppState, id: ItemId) -> Result<Widget, LayoutError> {
    let dashboard = state.dashboard.read().await;
    dashboard.widget(id).cloned().ok_or(LayoutError::WidgetNotFound(id))
}

pub async fn settings(state: &AppState) -> Settings {
    state.dashboard.read().await.settings.clone()
}

/// Verdict for moving widget `id` to `(x, y)`, without changing anything.
///
/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn preview_move(state: &AppState, id: ItemId, x: i32, y: i32) -> Result<MoveResult, LayoutError> {
    let dashboard = state.dashboard.read().await;
    let source = dashboard.widget(id).ok_or(LayoutError::WidgetNotFound(id))?;
    Ok(resolve_move(&dashboard.model(), source, x, y))
}

// =============================================================================
// WIDGET CRUD
// =============================================================================

/// Add a widget at its kind's default size in the first free slot.
///
/// # Errors
///
/// Returns `GridFull` if no slot fits the default size.
pub async fn create_widget(state: &AppState, new: NewWidget) -> Result<Widget, LayoutError> {
    let spec = new.kind.spec();
    let GridSize { cols, rows } = spec.default_size;

    let mut dashboard = state.dashboard.write().await;
    let (x, y) = dashboard.model().find_empty_slot(cols, rows).ok_or(LayoutError::GridFull { cols, rows })?;

    let mut data = new.data;
    new.kind.apply_defaults(&mut data);

    let widget = Widget {
        id: next_widget_id(&dashboard.widgets),
        name: new.name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| spec.label.to_owned()),
        kind: new.kind,
        x,
        y,
        cols,
        rows,
        data,
    };
    dashboard.widgets.push(widget.clone());
    dashboard.touch();

    info!(id = widget.id, kind = %widget.kind, x, y, "widget created");
    Ok(widget)
}

/// Rename a widget and/or merge its settings.
///
/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn update_widget(state: &AppState, id: ItemId, patch: WidgetPatch) -> Result<Widget, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let widget = dashboard.widget_mut(id).ok_or(LayoutError::WidgetNotFound(id))?;

    if let Some(name) = patch.name {
        widget.name = name;
    }
    if let Some(data) = patch.data {
        merge_map(&mut widget.data, data);
    }
    let updated = widget.clone();
    dashboard.touch();

    debug!(id, "widget updated");
    Ok(updated)
}

/// Remove a widget and cancel any gesture on it.
///
/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn delete_widget(state: &AppState, id: ItemId) -> Result<Widget, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let index = dashboard.widgets.iter().position(|w| w.id == id).ok_or(LayoutError::WidgetNotFound(id))?;
    let removed = dashboard.widgets.remove(index);
    dashboard.sessions.retain(|_, session| session.source_id() != id);
    dashboard.touch();

    info!(id, "widget deleted");
    Ok(removed)
}

/// Remove every widget and drop every session. Returns how many were removed.
pub async fn clear_widgets(state: &AppState) -> usize {
    let mut dashboard = state.dashboard.write().await;
    let count = dashboard.widgets.len();
    dashboard.widgets.clear();
    dashboard.sessions.clear();
    dashboard.touch();

    info!(count, "widgets cleared");
    count
}

// =============================================================================
// MOVE / RESIZE
// =============================================================================

/// Resolve a move and commit it when possible. The verdict is returned
/// either way; a rejection leaves the layout untouched.
///
/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn move_widget(state: &AppState, id: ItemId, x: i32, y: i32) -> Result<MoveResult, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let source = dashboard.widget(id).map(Placed::of).ok_or(LayoutError::WidgetNotFound(id))?;
    let result = resolve_move(&dashboard.model(), &source, x, y);

    if let Some(commit) = Commit::from_verdict(source, &result) {
        commit_changes(&mut dashboard, &commit)?;
        info!(id, x, y, displaced = result.displaced().len(), "widget moved");
    } else {
        debug!(id, x, y, ?result, "move rejected");
    }
    Ok(result)
}

/// Resize a widget in place. The size is clamped to at least 1x1 and to the
/// grid edge; the grown area must be free.
///
/// # Errors
///
/// Returns `WidgetNotFound` or `ResizeBlocked`.
pub async fn resize_widget(state: &AppState, id: ItemId, cols: i32, rows: i32) -> Result<Widget, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let current = dashboard.widget(id).map(GridItem::rect).ok_or(LayoutError::WidgetNotFound(id))?;
    let target = clamp_resize(current, dashboard.grid_size(), cols, rows);

    if !dashboard.model().is_area_free(target.x, target.y, target.cols, target.rows, Some(id)) {
        return Err(LayoutError::ResizeBlocked(id));
    }
    commit_changes(&mut dashboard, &Commit { changes: vec![Change { id, rect: target }] })?;

    info!(id, cols = target.cols, rows = target.rows, "widget resized");
    dashboard.widget(id).cloned().ok_or(LayoutError::WidgetNotFound(id))
}

fn commit_changes(dashboard: &mut DashboardState, commit: &Commit) -> Result<(), LayoutError> {
    let size = dashboard.grid_size();
    apply_commit(size, &mut dashboard.widgets, commit)?;
    dashboard.touch();
    Ok(())
}

// =============================================================================
// DRAG SESSIONS
// =============================================================================

/// Open a drag or resize gesture on a widget, dropping any session still
/// open from an earlier gesture.
///
/// # Errors
///
/// Returns `WidgetNotFound` if no widget has this id.
pub async fn begin_drag(state: &AppState, request: BeginDrag) -> Result<DragStarted, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let source = dashboard
        .widget(request.widget_id)
        .map(Placed::of)
        .ok_or(LayoutError::WidgetNotFound(request.widget_id))?;

    let session = match request.mode {
        DragMode::Move => DragSession::begin_move(source, request.pointer, request.metrics, dashboard.grid_size()),
        DragMode::Resize => DragSession::begin_resize(source, request.pointer, request.metrics),
    };
    // One gesture at a time; a new pointer-down supersedes any abandoned one.
    let superseded = dashboard.sessions.len();
    dashboard.sessions.clear();
    let session_id = Uuid::new_v4();
    dashboard.sessions.insert(session_id, session);

    debug!(%session_id, id = source.id, mode = ?request.mode, superseded, "drag started");
    Ok(DragStarted { session_id, widget_id: source.id, mode: request.mode })
}

/// Feed one pointer sample into a session.
///
/// # Errors
///
/// Returns `SessionNotFound`, or `WidgetNotFound` when the widget was deleted
/// mid-gesture (the session is dropped).
pub async fn drag_frame(state: &AppState, session_id: Uuid, pointer: Point) -> Result<Preview, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let model = dashboard.model();
    let session = dashboard.sessions.get_mut(&session_id).ok_or(LayoutError::SessionNotFound(session_id))?;

    if let Some(preview) = session.frame(&model, pointer) {
        return Ok(preview);
    }
    let id = session.source_id();
    dashboard.sessions.remove(&session_id);
    Err(LayoutError::WidgetNotFound(id))
}

/// Close a session, committing its final verdict if it is still valid.
///
/// # Errors
///
/// Returns `SessionNotFound` if the session does not exist.
pub async fn end_drag(state: &AppState, session_id: Uuid) -> Result<DragOutcome, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let session = dashboard.sessions.remove(&session_id).ok_or(LayoutError::SessionNotFound(session_id))?;
    let id = session.source_id();

    let Some(commit) = session.finish(&dashboard.model()) else {
        debug!(%session_id, id, "drag snapped back");
        return Ok(DragOutcome { committed: false, changes: Vec::new() });
    };
    commit_changes(&mut dashboard, &commit)?;

    info!(%session_id, id, changes = commit.changes.len(), "drag committed");
    Ok(DragOutcome { committed: true, changes: commit.changes })
}

/// Drop a session without touching the layout.
///
/// # Errors
///
/// Returns `SessionNotFound` if the session does not exist.
pub async fn cancel_drag(state: &AppState, session_id: Uuid) -> Result<(), LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    dashboard.sessions.remove(&session_id).ok_or(LayoutError::SessionNotFound(session_id))?;
    debug!(%session_id, "drag cancelled");
    Ok(())
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Apply a settings patch. Grid dimension changes are checked against every
/// widget first; nothing changes on error.
///
/// # Errors
///
/// Returns `InvalidGridSize` or `GridTooSmall`.
pub async fn update_settings(state: &AppState, patch: SettingsPatch) -> Result<Settings, LayoutError> {
    let mut dashboard = state.dashboard.write().await;
    let current = dashboard.grid_size();
    let theme = patch.theme.unwrap_or_default();
    let size = GridSize::new(theme.grid_columns.unwrap_or(current.cols), theme.grid_rows.unwrap_or(current.rows));

    if size != current {
        check_grid_resize(&dashboard.widgets, size)?;
    }

    let settings = &mut dashboard.settings;
    settings.theme.grid_columns = size.cols;
    settings.theme.grid_rows = size.rows;
    merge_map(&mut settings.theme.extra, theme.extra);
    if let Some(presets) = patch.custom_presets {
        settings.custom_presets = presets;
    }
    let updated = settings.clone();

    if size != current {
        // Pixel metrics captured at drag start no longer match the grid.
        dashboard.sessions.clear();
        info!(cols = size.cols, rows = size.rows, "grid resized");
    }
    dashboard.touch();
    Ok(updated)
}

/// Whether every widget still fits a grid of `size`.
///
/// # Errors
///
/// Returns `InvalidGridSize` or `GridTooSmall` naming the first widget that
/// would fall outside.
pub fn check_grid_resize(widgets: &[Widget], size: GridSize) -> Result<(), LayoutError> {
    if !is_valid_grid_size(size) {
        return Err(LayoutError::InvalidGridSize { cols: size.cols, rows: size.rows });
    }
    match widgets.iter().find(|w| !size.contains(w.rect())) {
        Some(w) => Err(LayoutError::GridTooSmall { id: w.id, cols: size.cols, rows: size.rows }),
        None => Ok(()),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Shallow merge; `null` deletes.
fn merge_map(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

/// Current time as milliseconds since Unix epoch.
pub(crate) fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Millisecond timestamp ids, bumped past the current maximum so ids stay
/// unique when widgets are created within the same millisecond.
pub(crate) fn next_widget_id(widgets: &[Widget]) -> ItemId {
    let max = widgets.iter().map(|w| w.id).max().unwrap_or(0);
    now_ms().max(max.saturating_add(1))
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
