//! Widget and layout routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::grid::{ItemId, MoveResult};
use crate::services::layout::{self, LayoutSnapshot, NewWidget, WidgetPatch};
use crate::state::{AppState, Widget};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveBody {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResizeBody {
    pub cols: i32,
    pub rows: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearedResponse {
    pub removed: usize,
}

/// `GET /api/layout`: grid dimensions and every widget.
pub async fn layout(State(state): State<AppState>) -> Json<LayoutSnapshot> {
    Json(layout::snapshot(&state).await)
}

/// `POST /api/widgets`: add a widget in the first free slot.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewWidget>,
) -> Result<(StatusCode, Json<Widget>), ApiError> {
    let widget = layout::create_widget(&state, body).await?;
    Ok((StatusCode::CREATED, Json(widget)))
}

/// `DELETE /api/widgets`: remove every widget.
pub async fn clear(State(state): State<AppState>) -> Json<ClearedResponse> {
    Json(ClearedResponse { removed: layout::clear_widgets(&state).await })
}

/// `GET /api/widgets/:id`
pub async fn get(State(state): State<AppState>, Path(id): Path<ItemId>) -> Result<Json<Widget>, ApiError> {
    Ok(Json(layout::get_widget(&state, id).await?))
}

/// `PATCH /api/widgets/:id`: rename and/or merge settings.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<WidgetPatch>,
) -> Result<Json<Widget>, ApiError> {
    Ok(Json(layout::update_widget(&state, id, body).await?))
}

/// `DELETE /api/widgets/:id`
pub async fn delete(State(state): State<AppState>, Path(id): Path<ItemId>) -> Result<StatusCode, ApiError> {
    layout::delete_widget(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/widgets/:id/check-move`: verdict only, nothing changes.
pub async fn check_move(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<MoveBody>,
) -> Result<Json<MoveResult>, ApiError> {
    Ok(Json(layout::preview_move(&state, id, body.x, body.y).await?))
}

/// `POST /api/widgets/:id/move`: resolve and commit. A rejected move is
/// still a 200 with `possible: false`.
pub async fn move_to(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<MoveBody>,
) -> Result<Json<MoveResult>, ApiError> {
    Ok(Json(layout::move_widget(&state, id, body.x, body.y).await?))
}

/// `POST /api/widgets/:id/resize`
pub async fn resize(
    State(state): State<AppState>,
    Path(id): Path<ItemId>,
    Json(body): Json<ResizeBody>,
) -> Result<Json<Widget>, ApiError> {
    Ok(Json(layout::resize_widget(&state, id, body.cols, body.rows).await?))
}

#[cfg(test)]
#[path = "widgets_test.rs"]
mod tests;
