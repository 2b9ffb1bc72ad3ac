use super::*;
use crate::state::test_helpers::{self, widget};
use crate::widgets::WidgetKind;
use serde_json::Map;

#[tokio::test]
async fn create_returns_created_widget() {
    let state = test_helpers::test_app_state();
    let body = NewWidget { kind: WidgetKind::Link, name: Some("Docs".into()), data: Map::new() };
    let (status, Json(created)) = create(State(state.clone()), Json(body)).await.unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.name, "Docs");
    assert_eq!((created.x, created.y), (1, 1));

    let Json(snapshot) = layout(State(state)).await;
    assert_eq!(snapshot.widgets, vec![created]);
}

#[tokio::test]
async fn missing_widget_is_not_found() {
    let state = test_helpers::test_app_state();
    let err = get(State(state.clone()), Path(42)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.body.code, "E_WIDGET_NOT_FOUND");

    let err = delete(State(state), Path(42)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_move_is_still_ok() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1)]);
    let Json(result) = move_to(State(state), Path(1), Json(MoveBody { x: 11, y: 1 })).await.unwrap();
    assert!(!result.is_possible());
}

#[tokio::test]
async fn check_move_then_move_commit() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1)]);
    let Json(preview) = check_move(State(state.clone()), Path(1), Json(MoveBody { x: 4, y: 2 })).await.unwrap();
    assert_eq!(preview.target(), Some((4, 2)));
    assert_eq!(state.dashboard.read().await.widgets[0].x, 1);

    move_to(State(state.clone()), Path(1), Json(MoveBody { x: 4, y: 2 })).await.unwrap();
    let Json(moved) = get(State(state), Path(1)).await.unwrap();
    assert_eq!((moved.x, moved.y), (4, 2));
}

#[tokio::test]
async fn resize_conflict_maps_to_409() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1), widget(2, 2, 1, 1, 1)]);
    let err = resize(State(state), Path(1), Json(ResizeBody { cols: 2, rows: 1 })).await.unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.body.code, "E_RESIZE_BLOCKED");
}

#[tokio::test]
async fn delete_and_clear() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 1, 1, 1, 1), widget(2, 2, 1, 1, 1)]);
    assert_eq!(delete(State(state.clone()), Path(1)).await.unwrap(), StatusCode::NO_CONTENT);

    let Json(cleared) = clear(State(state)).await;
    assert_eq!(cleared, ClearedResponse { removed: 1 });
}
