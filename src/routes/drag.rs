//! Drag and resize gesture routes. One session per gesture; the client
//! streams pointer samples to `frame` and closes with `end` or `cancel`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::grid::{Point, Preview};
use crate::services::layout::{self, BeginDrag, DragOutcome, DragStarted};
use crate::state::AppState;

/// `POST /api/drag`
pub async fn begin(State(state): State<AppState>, Json(body): Json<BeginDrag>) -> Result<Json<DragStarted>, ApiError> {
    Ok(Json(layout::begin_drag(&state, body).await?))
}

/// `POST /api/drag/:id/frame`: ghosts and verdict for one pointer sample.
pub async fn frame(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(pointer): Json<Point>,
) -> Result<Json<Preview>, ApiError> {
    Ok(Json(layout::drag_frame(&state, session_id, pointer).await?))
}

/// `POST /api/drag/:id/end`
pub async fn end(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> Result<Json<DragOutcome>, ApiError> {
    Ok(Json(layout::end_drag(&state, session_id).await?))
}

/// `DELETE /api/drag/:id`
pub async fn cancel(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    layout::cancel_drag(&state, session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "drag_test.rs"]
mod tests;
