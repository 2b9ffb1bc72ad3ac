//! Backup service: whole-dashboard export and import.
//!
//! DESIGN
//! ======
//! Export clones the live widgets and settings into a versioned document.
//! In `clean` mode, values under sensitive data keys are blanked so the file
//! can be shared without credentials or service URLs.
//!
//! Import is strict. Widgets deserialize through the same typed `Widget` used
//! everywhere else, so unknown kinds and non-integer coordinates fail at the
//! boundary. The resulting layout is validated against the imported grid
//! before anything is replaced; a rejected document changes nothing.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::ErrorCode;
use crate::grid::model::{LayoutViolation, validate_layout};
use crate::services::layout::{LayoutSnapshot, now_ms, snapshot_of};
use crate::state::{AppState, Settings, Widget, is_valid_grid_size};

pub const EXPORT_VERSION: &str = "2.0";

/// Data keys blanked by a clean export.
pub const SENSITIVE_KEYS: [&str; 8] = ["apiKey", "password", "token", "secret", "auth", "key", "userId", "url"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackupError {
    #[error("grid size {cols}x{rows} is out of range")]
    InvalidGridSize { cols: i32, rows: i32 },
    #[error("invalid layout: {0}")]
    Invalid(#[from] LayoutViolation),
}

impl ErrorCode for BackupError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidGridSize { .. } => "E_INVALID_GRID_SIZE",
            Self::Invalid(_) => "E_INVALID_LAYOUT",
        }
    }

    fn status(&self) -> StatusCode {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Full,
    Clean,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub apps: Vec<Widget>,
    pub settings: Settings,
    pub timestamp: i64,
    pub version: &'static str,
    pub mode: ExportMode,
}

/// Import payload. Missing sections keep the current value; `timestamp`,
/// `version` and `mode` are informational and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub apps: Option<Vec<Widget>>,
    #[serde(default)]
    pub settings: Option<Settings>,
}

// =============================================================================
// EXPORT
// =============================================================================

pub async fn export_document(state: &AppState, sanitize: bool) -> ExportDocument {
    let (mut apps, settings) = {
        let dashboard = state.dashboard.read().await;
        (dashboard.widgets.clone(), dashboard.settings.clone())
    };

    if sanitize {
        for app in &mut apps {
            sanitize_data(&mut app.data);
        }
    }

    ExportDocument {
        apps,
        settings,
        timestamp: now_ms(),
        version: EXPORT_VERSION,
        mode: if sanitize { ExportMode::Clean } else { ExportMode::Full },
    }
}

/// Blank every sensitive key that holds a non-empty value.
pub fn sanitize_data(data: &mut serde_json::Map<String, Value>) {
    for key in SENSITIVE_KEYS {
        if let Some(value) = data.get_mut(key) {
            if is_set(value) {
                *value = Value::String(String::new());
            }
        }
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// IMPORT
// =============================================================================

/// Replace widgets and settings with the document's, dropping every drag
/// session.
///
/// # Errors
///
/// Returns `InvalidGridSize` or `Invalid` if the resulting dashboard would
/// break a layout invariant. Nothing changes on error.
pub async fn import_document(state: &AppState, doc: ImportDocument) -> Result<LayoutSnapshot, BackupError> {
    let mut dashboard = state.dashboard.write().await;

    let settings = doc.settings.unwrap_or_else(|| dashboard.settings.clone());
    let size = settings.theme.grid_size();
    if !is_valid_grid_size(size) {
        return Err(BackupError::InvalidGridSize { cols: size.cols, rows: size.rows });
    }

    let widgets = doc.apps.unwrap_or_else(|| dashboard.widgets.clone());
    validate_layout(size, &widgets)?;

    dashboard.widgets = widgets;
    dashboard.settings = settings;
    dashboard.sessions.clear();
    dashboard.touch();

    info!(count = dashboard.widgets.len(), cols = size.cols, rows = size.rows, "dashboard imported");
    Ok(snapshot_of(&dashboard))
}

#[cfg(test)]
#[path = "backup_test.rs"]
mod tests;
