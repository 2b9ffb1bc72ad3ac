//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The JSON API lives under `/api`; every other path falls through to the
//! static frontend directory. CORS is applied to the API only, tracing and
//! gzip compression to everything.

pub mod drag;
pub mod settings;
pub mod widgets;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/layout", get(widgets::layout))
        .route("/api/widget-kinds", get(settings::widget_kinds))
        .route("/api/widgets", post(widgets::create).delete(widgets::clear))
        .route("/api/widgets/{id}", get(widgets::get).patch(widgets::update).delete(widgets::delete))
        .route("/api/widgets/{id}/check-move", post(widgets::check_move))
        .route("/api/widgets/{id}/move", post(widgets::move_to))
        .route("/api/widgets/{id}/resize", post(widgets::resize))
        .route("/api/drag", post(drag::begin))
        .route("/api/drag/{id}/frame", post(drag::frame))
        .route("/api/drag/{id}/end", post(drag::end))
        .route("/api/drag/{id}", axum::routing::delete(drag::cancel))
        .route("/api/settings", get(settings::get).patch(settings::update))
        .route("/api/export", get(settings::export))
        .route("/api/import", post(settings::import))
        .route("/api/save", post(settings::save))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application: API routes plus the static frontend at `web_dir`.
pub fn app(state: AppState, web_dir: &Path) -> Router {
    let frontend = ServeDir::new(web_dir).append_index_html_on_directories(true);

    api_routes(state)
        .fallback_service(frontend)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
