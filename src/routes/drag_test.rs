use super::*;
use crate::grid::{DragMode, GridMetrics};
use crate::state::test_helpers::{self, widget};

fn begin_body(widget_id: i64) -> BeginDrag {
    BeginDrag {
        widget_id,
        mode: DragMode::Move,
        pointer: Point::new(150.0, 50.0),
        metrics: GridMetrics { left: 0.0, top: 0.0, width: 1000.0, height: 600.0 },
    }
}

#[tokio::test]
async fn gesture_round_trip() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 2, 1, 1, 1)]);
    let Json(started) = begin(State(state.clone()), Json(begin_body(1))).await.unwrap();

    let Json(preview) = frame(State(state.clone()), Path(started.session_id), Json(Point::new(350.0, 250.0)))
        .await
        .unwrap();
    assert_eq!(preview.result.and_then(|r| r.target()), Some((4, 3)));

    let Json(outcome) = end(State(state.clone()), Path(started.session_id)).await.unwrap();
    assert!(outcome.committed);
    let dashboard = state.dashboard.read().await;
    assert_eq!((dashboard.widgets[0].x, dashboard.widgets[0].y), (4, 3));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let state = test_helpers::test_app_state();
    let err = end(State(state.clone()), Path(Uuid::nil())).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.body.code, "E_SESSION_NOT_FOUND");

    let err = frame(State(state), Path(Uuid::nil()), Json(Point::new(0.0, 0.0))).await.unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_returns_no_content() {
    let state = test_helpers::test_app_state_with(vec![widget(1, 2, 1, 1, 1)]);
    let Json(started) = begin(State(state.clone()), Json(begin_body(1))).await.unwrap();
    assert_eq!(cancel(State(state.clone()), Path(started.session_id)).await.unwrap(), StatusCode::NO_CONTENT);
    assert!(cancel(State(state), Path(started.session_id)).await.is_err());
}

#[tokio::test]
async fn begin_on_missing_widget_fails() {
    let state = test_helpers::test_app_state();
    let err = begin(State(state), Json(begin_body(5))).await.unwrap_err();
    assert_eq!(err.body.code, "E_WIDGET_NOT_FOUND");
}
