use super::*;
use crate::grid::{DragMode, GridMetrics, GridSize, Point};
use crate::services::layout::{self, BeginDrag};
use crate::state::test_helpers::{self, widget};
use serde_json::json;

fn link(id: i64, url: &str) -> Widget {
    let mut w = widget(id, 1, 1, 1, 1);
    w.data.insert("url".into(), Value::String(url.into()));
    w.data.insert("icon".into(), Value::String("github".into()));
    w
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn full_export_keeps_everything() {
    let state = test_helpers::test_app_state_with(vec![link(1, "https://example.com")]);
    let doc = export_document(&state, false).await;

    assert_eq!(doc.mode, ExportMode::Full);
    assert_eq!(doc.version, "2.0");
    assert_eq!(doc.apps[0].data["url"], "https://example.com");
    assert!(doc.timestamp > 0);
}

#[tokio::test]
async fn clean_export_blanks_sensitive_keys_only() {
    let state = test_helpers::test_app_state_with(vec![link(1, "https://example.com")]);
    let doc = export_document(&state, true).await;

    assert_eq!(doc.mode, ExportMode::Clean);
    assert_eq!(doc.apps[0].data["url"], "");
    assert_eq!(doc.apps[0].data["icon"], "github");
    // Live state is untouched.
    assert_eq!(state.dashboard.read().await.widgets[0].data["url"], "https://example.com");
}

#[test]
fn sanitize_leaves_falsy_values_alone() {
    let mut data = json!({ "apiKey": "abc", "token": "", "password": null, "auth": true, "secret": 0, "userId": 7 })
        .as_object()
        .cloned()
        .unwrap();
    sanitize_data(&mut data);

    assert_eq!(data["apiKey"], "");
    assert_eq!(data["token"], "");
    assert_eq!(data["password"], Value::Null);
    assert_eq!(data["auth"], "");
    assert_eq!(data["secret"], 0);
    assert_eq!(data["userId"], "");
}

#[tokio::test]
async fn export_serializes_document_shape() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 2, 3, 1, 1)]);
    let value = serde_json::to_value(export_document(&state, true).await).unwrap();

    assert_eq!(value["mode"], "clean");
    assert_eq!(value["version"], "2.0");
    assert_eq!(value["apps"][0]["subtype"], "note");
    assert_eq!(value["settings"]["theme"]["gridColumns"], 10);
    assert!(value["settings"]["custom_presets"].is_object());
}

// =============================================================================
// Import
// =============================================================================

#[tokio::test]
async fn import_replaces_dashboard_and_drops_sessions() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1)]);
    layout::begin_drag(
        &state,
        BeginDrag {
            widget_id: 1,
            mode: DragMode::Move,
            pointer: Point::new(0.0, 0.0),
            metrics: GridMetrics { left: 0.0, top: 0.0, width: 1000.0, height: 600.0 },
        },
    )
    .await
    .unwrap();

    let doc: ImportDocument = serde_json::from_value(json!({
        "apps": [
            { "id": 10, "name": "A", "subtype": "clock", "type": "static", "x": 11, "y": 1, "cols": 2, "rows": 1, "data": {} },
            { "id": 11, "name": "B", "subtype": "link", "x": 1, "y": 1, "cols": 1, "rows": 1 }
        ],
        "settings": { "theme": { "gridColumns": 12, "gridRows": 4, "activePalette": "nord" } },
        "timestamp": 1,
        "version": "2.0",
        "mode": "full"
    }))
    .unwrap();

    let snapshot = import_document(&state, doc).await.unwrap();
    assert_eq!((snapshot.columns, snapshot.rows), (12, 4));
    assert_eq!(snapshot.widgets.len(), 2);

    let dashboard = state.dashboard.read().await;
    assert!(dashboard.sessions.is_empty());
    assert_eq!(dashboard.grid_size(), GridSize::new(12, 4));
    assert_eq!(dashboard.settings.theme.extra["activePalette"], "nord");
    assert!(dashboard.is_dirty());
}

#[tokio::test]
async fn import_rejects_overlap_without_changes() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1)]);
    let doc = ImportDocument { apps: Some(vec![widget(2, 1, 1, 2, 2), widget(3, 2, 2, 1, 1)]), settings: None };

    assert_eq!(import_document(&state, doc).await, Err(BackupError::Invalid(LayoutViolation::Overlap { a: 2, b: 3 })));
    let dashboard = state.dashboard.read().await;
    assert_eq!(dashboard.widgets, vec![widget(1, 1, 1, 1, 1)]);
    assert!(!dashboard.is_dirty());
}

#[tokio::test]
async fn import_checks_widgets_against_imported_grid() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 8, 1, 1, 1)]);
    let mut settings = Settings::default();
    settings.theme.grid_columns = 6;

    let doc = ImportDocument { apps: None, settings: Some(settings.clone()) };
    assert_eq!(import_document(&state, doc).await, Err(BackupError::Invalid(LayoutViolation::OutOfBounds(1))));

    settings.theme.grid_columns = 0;
    let doc = ImportDocument { apps: Some(vec![]), settings: Some(settings) };
    assert_eq!(import_document(&state, doc).await, Err(BackupError::InvalidGridSize { cols: 0, rows: 6 }));
}

#[test]
fn import_document_rejects_malformed_widgets() {
    let unknown = json!({ "apps": [{ "id": 1, "name": "x", "subtype": "toaster", "x": 1, "y": 1, "cols": 1, "rows": 1 }] });
    assert!(serde_json::from_value::<ImportDocument>(unknown).is_err());

    let fractional = json!({ "apps": [{ "id": 1, "name": "x", "subtype": "note", "x": 1.5, "y": 1, "cols": 1, "rows": 1 }] });
    assert!(serde_json::from_value::<ImportDocument>(fractional).is_err());
}

#[test]
fn import_document_rejects_string_grid_dimensions() {
    let legacy = json!({ "settings": { "theme": { "gridColumns": "12", "gridRows": 6 } } });
    assert!(serde_json::from_value::<ImportDocument>(legacy).is_err());
}
