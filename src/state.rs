//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool and the one live dashboard: the authoritative
//! widget list, the settings document, and any in-flight drag sessions.
//! A revision counter tracks committed mutations for debounced persistence.
//!
//! Everything lives behind a single `RwLock`. A drag commit and all of its
//! displaced widgets are written inside one write-lock section, so readers
//! never observe a half-applied rearrangement.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::grid::{DragSession, GridItem, GridModel, GridSize, ItemId, Placeable, Rect};
use crate::widgets::WidgetKind;

/// Largest accepted grid dimension on either axis.
pub const MAX_GRID_DIM: i32 = 64;

pub const DEFAULT_GRID_COLUMNS: i32 = 10;
pub const DEFAULT_GRID_ROWS: i32 = 6;
pub const DEFAULT_PALETTE: &str = "default-dark";

// =============================================================================
// WIDGET
// =============================================================================

/// One card on the dashboard. Mirrors a row of the `widgets` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "subtype")]
    pub kind: WidgetKind,
    pub x: i32,
    pub y: i32,
    pub cols: i32,
    pub rows: i32,
    /// Widget settings, opaque to the layout engine.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl GridItem for Widget {
    fn id(&self) -> ItemId {
        self.id
    }

    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.cols, self.rows)
    }
}

impl Placeable for Widget {
    fn place(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.cols = rect.cols;
        self.rows = rect.rows;
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Theme document. Only the grid dimensions are interpreted server-side;
/// palette and styling keys pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default = "default_grid_columns")]
    pub grid_columns: i32,
    #[serde(default = "default_grid_rows")]
    pub grid_rows: i32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_grid_columns() -> i32 {
    DEFAULT_GRID_COLUMNS
}

fn default_grid_rows() -> i32 {
    DEFAULT_GRID_ROWS
}

impl Theme {
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid_columns, self.grid_rows)
    }
}

impl Default for Theme {
    fn default() -> Self {
        let mut extra = Map::new();
        extra.insert("activePalette".into(), Value::String(DEFAULT_PALETTE.into()));
        Self { grid_columns: DEFAULT_GRID_COLUMNS, grid_rows: DEFAULT_GRID_ROWS, extra }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(rename = "custom_presets", alias = "customPresets", default)]
    pub custom_presets: Map<String, Value>,
}

/// Whether both dimensions are within `1..=MAX_GRID_DIM`.
#[must_use]
pub fn is_valid_grid_size(size: GridSize) -> bool {
    (1..=MAX_GRID_DIM).contains(&size.cols) && (1..=MAX_GRID_DIM).contains(&size.rows)
}

// =============================================================================
// DASHBOARD STATE
// =============================================================================

/// Live dashboard. Flushed to `SQLite` by the persistence task.
pub struct DashboardState {
    /// Widgets in insertion order.
    pub widgets: Vec<Widget>,
    pub settings: Settings,
    /// In-flight drag/resize gestures keyed by session id.
    pub sessions: HashMap<Uuid, DragSession>,
    /// Bumped on every committed mutation.
    pub revision: u64,
    /// Last revision written to the database.
    pub persisted_revision: u64,
}

impl DashboardState {
    #[must_use]
    pub fn new(widgets: Vec<Widget>, settings: Settings) -> Self {
        Self { widgets, settings, sessions: HashMap::new(), revision: 0, persisted_revision: 0 }
    }

    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        self.settings.theme.grid_size()
    }

    /// Fresh occupancy snapshot of the current widgets.
    #[must_use]
    pub fn model(&self) -> GridModel {
        GridModel::new(self.grid_size(), &self.widgets)
    }

    #[must_use]
    pub fn widget(&self, id: ItemId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn widget_mut(&mut self, id: ItemId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Record a committed mutation.
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision != self.persisted_revision
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Vec::new(), Settings::default())
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub dashboard: Arc<RwLock<DashboardState>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool, dashboard: DashboardState) -> Self {
        Self { pool, dashboard: Arc::new(RwLock::new(dashboard)) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
