//! Settings, widget registry, backup, and save routes.

use axum::extract::{Query, State};
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::backup::{self, ExportMode, ImportDocument};
use crate::services::layout::{self, LayoutSnapshot, SettingsPatch};
use crate::services::persistence;
use crate::state::{AppState, Settings};
use crate::widgets::{WidgetSpec, all_specs};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub sanitize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveResponse {
    pub written: bool,
}

/// `GET /api/settings`
pub async fn get(State(state): State<AppState>) -> Json<Settings> {
    Json(layout::settings(&state).await)
}

/// `PATCH /api/settings`: merge theme keys, change grid dimensions.
pub async fn update(State(state): State<AppState>, Json(body): Json<SettingsPatch>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(layout::update_settings(&state, body).await?))
}

/// `GET /api/widget-kinds`: every widget kind with its settings schema.
pub async fn widget_kinds() -> Json<Vec<&'static WidgetSpec>> {
    Json(all_specs())
}

/// `GET /api/export?sanitize=`: download the dashboard as a JSON file.
pub async fn export(State(state): State<AppState>, Query(query): Query<ExportQuery>) -> Response {
    let doc = backup::export_document(&state, query.sanitize).await;
    let label = match doc.mode {
        ExportMode::Full => "FULL",
        ExportMode::Clean => "CLEAN",
    };
    let disposition = format!("attachment; filename=\"hestia_config_{label}_{}.json\"", doc.timestamp);

    ([(CONTENT_DISPOSITION, disposition)], Json(doc)).into_response()
}

/// `POST /api/import`: replace the dashboard with an exported document.
pub async fn import(
    State(state): State<AppState>,
    Json(body): Json<ImportDocument>,
) -> Result<Json<LayoutSnapshot>, ApiError> {
    Ok(Json(backup::import_document(&state, body).await?))
}

/// `POST /api/save`: write pending changes now instead of waiting for the
/// next flush tick.
pub async fn save(State(state): State<AppState>) -> Result<Json<SaveResponse>, ApiError> {
    let written = persistence::flush_if_dirty(&state).await?;
    Ok(Json(SaveResponse { written }))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
