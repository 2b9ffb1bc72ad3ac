//! Persistence service: startup hydration and debounced flush of the
//! dashboard to `SQLite`.
//!
//! DESIGN
//! ======
//! The in-memory dashboard is authoritative. A background task wakes every
//! `interval_ms`, and when the revision has moved past the last persisted one
//! it clones widgets and settings under the read lock, releases it, then
//! rewrites both tables in a single transaction. The flushed revision is
//! recorded afterwards; a commit that landed during the write leaves the
//! state dirty for the next tick.
//!
//! EDGE CASES
//! ==========
//! - No stored settings means a first run: the default layout is seeded and
//!   written immediately.
//! - Stored widgets that are malformed, outside the grid, or overlapping an
//!   earlier row are skipped with a warning. Nothing is clipped.
//! - A failed flush keeps the state dirty so the next tick retries.

use std::time::Duration;

use serde_json::{Map, Value, json};
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::ErrorCode;
use crate::grid::{GridItem, GridSize, Rect};
use crate::state::{AppState, DashboardState, Settings, Theme, Widget, is_valid_grid_size};
use crate::widgets::WidgetKind;

const THEME_KEY: &str = "theme";
const PRESETS_KEY: &str = "custom_presets";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::Json(_) => "E_SERIALIZATION",
        }
    }
}

/// Why a stored widget row was skipped.
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("unknown widget kind {0:?}")]
    UnknownKind(String),
    #[error("{0} out of range")]
    OutOfRange(&'static str),
    #[error("empty footprint")]
    EmptySize,
    #[error("invalid data: {0}")]
    Data(#[from] serde_json::Error),
    #[error("outside the {cols}x{rows} grid")]
    OutOfBounds { cols: i32, rows: i32 },
    #[error("overlaps widget {0}")]
    Overlap(i64),
    #[error("duplicate id")]
    DuplicateId,
}

type WidgetRow = (i64, String, String, i64, i64, i64, i64, String);

// =============================================================================
// LOAD
// =============================================================================

/// Load the dashboard, seeding the default layout on first run.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn load_dashboard(pool: &SqlitePool) -> Result<DashboardState, PersistenceError> {
    let stored = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings").fetch_all(pool).await?;

    if stored.is_empty() {
        let widgets = default_widgets();
        let settings = Settings::default();
        save_dashboard(pool, &widgets, &settings).await?;
        info!(count = widgets.len(), "seeded default dashboard");
        return Ok(DashboardState::new(widgets, settings));
    }

    let settings = settings_from_rows(stored);
    let size = settings.theme.grid_size();

    let rows = sqlx::query_as::<_, WidgetRow>(
        "SELECT id, name, kind, x, y, col_span, row_span, data FROM widgets ORDER BY position, id",
    )
    .fetch_all(pool)
    .await?;

    let mut widgets: Vec<Widget> = Vec::with_capacity(rows.len());
    for row in rows {
        let id = row.0;
        match widget_from_row(row).and_then(|w| check_against(size, &widgets, w)) {
            Ok(widget) => widgets.push(widget),
            Err(e) => warn!(id, error = %e, "skipping stored widget"),
        }
    }

    info!(count = widgets.len(), cols = size.cols, rows = size.rows, "dashboard loaded");
    Ok(DashboardState::new(widgets, settings))
}

fn settings_from_rows(rows: Vec<(String, String)>) -> Settings {
    let mut settings = Settings::default();
    for (key, value) in rows {
        match key.as_str() {
            THEME_KEY => match serde_json::from_str::<Theme>(&value) {
                Ok(theme) if is_valid_grid_size(theme.grid_size()) => settings.theme = theme,
                Ok(theme) => {
                    warn!(cols = theme.grid_columns, rows = theme.grid_rows, "stored grid size out of range");
                }
                Err(e) => warn!(error = %e, "stored theme is malformed"),
            },
            PRESETS_KEY => match serde_json::from_str::<Map<String, Value>>(&value) {
                Ok(presets) => settings.custom_presets = presets,
                Err(e) => warn!(error = %e, "stored presets are malformed"),
            },
            other => warn!(key = other, "ignoring unknown settings key"),
        }
    }
    settings
}

fn widget_from_row(row: WidgetRow) -> Result<Widget, RowError> {
    let (id, name, kind, x, y, cols, rows, data) = row;
    let kind = WidgetKind::parse(&kind).ok_or(RowError::UnknownKind(kind))?;
    let int = |value: i64, field: &'static str| i32::try_from(value).map_err(|_| RowError::OutOfRange(field));

    let widget = Widget {
        id,
        name,
        kind,
        x: int(x, "x")?,
        y: int(y, "y")?,
        cols: int(cols, "cols")?,
        rows: int(rows, "rows")?,
        data: serde_json::from_str(&data)?,
    };
    if widget.rect().is_empty() {
        return Err(RowError::EmptySize);
    }
    Ok(widget)
}

fn check_against(size: GridSize, accepted: &[Widget], widget: Widget) -> Result<Widget, RowError> {
    if !size.contains(widget.rect()) {
        return Err(RowError::OutOfBounds { cols: size.cols, rows: size.rows });
    }
    for other in accepted {
        if other.id == widget.id {
            return Err(RowError::DuplicateId);
        }
        if other.rect().intersects(widget.rect()) {
            return Err(RowError::Overlap(other.id));
        }
    }
    Ok(widget)
}

// =============================================================================
// SAVE
// =============================================================================

/// Replace the stored dashboard with `widgets` and `settings` in one
/// transaction.
///
/// # Errors
///
/// Returns an error if serialization or any statement fails; the stored
/// dashboard is then unchanged.
pub async fn save_dashboard(pool: &SqlitePool, widgets: &[Widget], settings: &Settings) -> Result<(), PersistenceError> {
    let theme = serde_json::to_string(&settings.theme)?;
    let presets = serde_json::to_string(&settings.custom_presets)?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM widgets").execute(&mut *tx).await?;
    for (position, widget) in (0_i64..).zip(widgets) {
        sqlx::query(
            "INSERT INTO widgets (id, name, kind, x, y, col_span, row_span, data, position) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(widget.id)
        .bind(&widget.name)
        .bind(widget.kind.as_str())
        .bind(widget.x)
        .bind(widget.y)
        .bind(widget.cols)
        .bind(widget.rows)
        .bind(serde_json::to_string(&widget.data)?)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query("DELETE FROM settings").execute(&mut *tx).await?;
    for (key, value) in [(THEME_KEY, theme), (PRESETS_KEY, presets)] {
        sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

// =============================================================================
// FLUSH
// =============================================================================

/// Spawn the background persistence task. Returns a handle for shutdown.
pub fn spawn_persistence_task(state: AppState, interval_ms: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        loop {
            interval.tick().await;
            if let Err(e) = flush_if_dirty(&state).await {
                error!(error = %e, "persistence flush failed");
            }
        }
    })
}

/// Write the dashboard if it has unflushed commits. Returns whether a write
/// happened.
///
/// # Errors
///
/// Returns the save error; the state stays dirty.
pub async fn flush_if_dirty(state: &AppState) -> Result<bool, PersistenceError> {
    let (revision, widgets, settings) = {
        let dashboard = state.dashboard.read().await;
        if !dashboard.is_dirty() {
            return Ok(false);
        }
        (dashboard.revision, dashboard.widgets.clone(), dashboard.settings.clone())
    };

    save_dashboard(&state.pool, &widgets, &settings).await?;

    let mut dashboard = state.dashboard.write().await;
    dashboard.persisted_revision = dashboard.persisted_revision.max(revision);
    Ok(true)
}

// =============================================================================
// DEFAULT LAYOUT
// =============================================================================

/// Layout seeded on first run.
#[must_use]
pub fn default_widgets() -> Vec<Widget> {
    let surface = |extra: Value| {
        let mut data = Map::new();
        data.insert("bgColor".into(), Value::String("var(--bg-surface)".into()));
        data.insert("textColor".into(), Value::String("var(--text-main)".into()));
        if let Value::Object(extra) = extra {
            data.extend(extra);
        }
        data
    };

    vec![
        seeded(
            1_764_067_661_194,
            WidgetKind::Note,
            "Note app",
            Rect::new(5, 2, 2, 2),
            surface(json!({
                "title": "Welcome to 🔥 Hestia!",
                "text": "*To start:*\n[ :fa-solid fa-pen-to-square: ] Enter Edit Mode\n\
                         [ :fa-solid fa-floppy-disk: ] Save changes and exit\n\n\
                         *While in Edit mode:*\n[ :fa-solid fa-plus: ] Add app.\n\
                         [ :fa-solid fa-eraser: ] clear all apps.\n\
                         [ :fa-solid fa-gear: ] change dashboard settings.\n\n\
                         [ :fa-solid fa-arrow-pointer: ] Double-click note to edit",
            })),
        ),
        seeded(
            1_764_068_167_057,
            WidgetKind::Image,
            "Image",
            Rect::new(7, 2, 2, 3),
            surface(json!({ "src": "assets/img.jpg", "fit": "cover" })),
        ),
        seeded(1_764_071_158_714, WidgetKind::Clock, "Untitled", Rect::new(3, 2, 2, 1), surface(json!({ "format": "24" }))),
        seeded(1_764_071_405_510, WidgetKind::Calendar, "Untitled", Rect::new(3, 3, 2, 2), surface(Value::Null)),
        seeded(
            1_764_071_478_849,
            WidgetKind::Weather,
            "Paris",
            Rect::new(3, 5, 2, 1),
            surface(json!({ "lat": "", "lon": "" })),
        ),
        seeded(
            1_764_083_611_404,
            WidgetKind::Link,
            "Github",
            Rect::new(7, 5, 1, 1),
            surface(json!({
                "url": "https://github.com/mult1v4c/hestia-core",
                "icon": "github",
                "hideLabel": "true",
                "bgColor": "var(--base06)",
                "textColor": "var(--base01)",
            })),
        ),
        seeded(
            1_764_085_472_564,
            WidgetKind::Note,
            "Untitled",
            Rect::new(5, 4, 2, 2),
            surface(json!({
                "title": "",
                "text": "# Basic Markdown\n---\n## Heading 2\n### Heading 3\n\
                         Normal Text / *Italic* / **Bold**\n`$ code` / [Links](http://127.0.0.1)\n\
                         - [ ] Item\n- [x] Item\n- List\n- List",
            })),
        ),
        seeded(
            1_764_090_614_585,
            WidgetKind::Link,
            "Youtube",
            Rect::new(8, 5, 1, 1),
            surface(json!({
                "url": "https://www.youtube.com/watch?v=Y6ljFaKRTrI",
                "icon": "youtube",
                "hideLabel": "true",
                "bgColor": "var(--base08)",
                "textColor": "var(--base06)",
            })),
        ),
    ]
}

fn seeded(id: i64, kind: WidgetKind, name: &str, rect: Rect, data: Map<String, Value>) -> Widget {
    Widget { id, name: name.to_owned(), kind, x: rect.x, y: rect.y, cols: rect.cols, rows: rect.rows, data }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
