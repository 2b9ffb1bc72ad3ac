use super::*;
use crate::state::test_helpers::{self, test_pool, widget};
use crate::state::DashboardState;
use crate::widgets::WidgetKind;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn widget_kinds_lists_every_kind() {
    let Json(specs) = widget_kinds().await;
    assert_eq!(specs.len(), WidgetKind::ALL.len());
}

#[tokio::test]
async fn grid_shrink_conflict_maps_to_409() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 10, 6, 1, 1)]);
    let patch: SettingsPatch = serde_json::from_value(json!({ "theme": { "gridColumns": 8 } })).unwrap();
    let err = update(State(state.clone()), Json(patch)).await.unwrap_err();

    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.body.code, "E_GRID_TOO_SMALL");
    let Json(settings) = get(State(state)).await;
    assert_eq!(settings.theme.grid_columns, 10);
}

#[tokio::test]
async fn export_sets_attachment_filename() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1)]);
    let response = export(State(state), Query(ExportQuery { sanitize: true })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"hestia_config_CLEAN_"));
}

#[tokio::test]
async fn invalid_import_maps_to_422() {
    let state = test_helpers::test_app_state();
    let doc = ImportDocument { apps: Some(vec![widget(1, 1, 1, 1, 1), widget(1, 3, 1, 1, 1)]), settings: None };
    let err = import(State(state.clone()), Json(doc)).await.unwrap_err();

    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.body.code, "E_INVALID_LAYOUT");
    assert!(state.dashboard.read().await.widgets.is_empty());
}

#[tokio::test]
async fn save_writes_pending_changes() {
    let state = AppState::new(test_pool().await, DashboardState::new(vec![widget(1, 1, 1, 1, 1)], Settings::default()));
    let Json(clean) = save(State(state.clone())).await.unwrap();
    assert_eq!(clean, SaveResponse { written: false });

    state.dashboard.write().await.touch();
    let Json(saved) = save(State(state.clone())).await.unwrap();
    assert_eq!(saved, SaveResponse { written: true });
    assert!(!state.dashboard.read().await.is_dirty());
}

#[tokio::test]
async fn failed_save_maps_to_500() {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), DashboardState::default());
    state.dashboard.write().await.touch();
    pool.close().await;

    let err = save(State(state.clone())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.body.code, "E_DATABASE");
    assert!(state.dashboard.read().await.is_dirty());
}
