use super::*;
use crate::grid::model::validate_layout;
use crate::state::test_helpers::{test_pool, widget};

async fn insert_raw(pool: &SqlitePool, id: i64, kind: &str, rect: (i64, i64, i64, i64), data: &str, position: i64) {
    sqlx::query(
        "INSERT INTO widgets (id, name, kind, x, y, col_span, row_span, data, position) \
         VALUES (?, 'raw', ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(kind)
    .bind(rect.0)
    .bind(rect.1)
    .bind(rect.2)
    .bind(rect.3)
    .bind(data)
    .bind(position)
    .execute(pool)
    .await
    .unwrap();
}

// =============================================================================
// Default layout
// =============================================================================

#[test]
fn default_widgets_form_a_valid_layout() {
    let widgets = default_widgets();
    assert_eq!(widgets.len(), 8);
    assert!(validate_layout(GridSize::new(10, 6), &widgets).is_ok());
}

#[test]
fn default_widgets_carry_surface_colors() {
    let widgets = default_widgets();
    let clock = widgets.iter().find(|w| w.kind == WidgetKind::Clock).unwrap();
    assert_eq!(clock.data["format"], "24");
    assert_eq!(clock.data["bgColor"], "var(--bg-surface)");

    let github = widgets.iter().find(|w| w.name == "Github").unwrap();
    assert_eq!(github.data["bgColor"], "var(--base06)");
    assert_eq!(github.data["hideLabel"], "true");
}

// =============================================================================
// Load / save
// =============================================================================

#[tokio::test]
async fn first_load_seeds_and_stores_defaults() {
    let pool = test_pool().await;
    let first = load_dashboard(&pool).await.unwrap();
    assert_eq!(first.widgets, default_widgets());
    assert!(!first.is_dirty());

    let second = load_dashboard(&pool).await.unwrap();
    assert_eq!(second.widgets, first.widgets);
    assert_eq!(second.settings, Settings::default());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let pool = test_pool().await;
    let mut note = widget(5, 2, 3, 2, 1);
    note.data.insert("title".into(), Value::String("hello".into()));
    let widgets = vec![widget(9, 1, 1, 1, 1), note];

    let mut settings = Settings::default();
    settings.theme.grid_columns = 12;
    settings.theme.extra.insert("gapSize".into(), Value::String("6px".into()));
    settings.custom_presets.insert("mine".into(), json!({ "base00": "#000" }));

    save_dashboard(&pool, &widgets, &settings).await.unwrap();
    let loaded = load_dashboard(&pool).await.unwrap();

    assert_eq!(loaded.widgets, widgets);
    assert_eq!(loaded.settings, settings);
}

#[tokio::test]
async fn empty_dashboard_is_not_reseeded() {
    let pool = test_pool().await;
    save_dashboard(&pool, &[], &Settings::default()).await.unwrap();
    assert!(load_dashboard(&pool).await.unwrap().widgets.is_empty());
}

#[tokio::test]
async fn malformed_rows_are_skipped() {
    let pool = test_pool().await;
    save_dashboard(&pool, &[widget(1, 1, 1, 2, 2)], &Settings::default()).await.unwrap();

    insert_raw(&pool, 2, "toaster", (5, 1, 1, 1), "{}", 1).await;
    insert_raw(&pool, 3, "note", (5, 2, 1, 1), "not json", 2).await;
    insert_raw(&pool, 4, "note", (2, 2, 1, 1), "{}", 3).await;
    insert_raw(&pool, 5, "note", (10, 6, 2, 1), "{}", 4).await;
    insert_raw(&pool, 6, "note", (5, 3, 0, 1), "{}", 5).await;
    insert_raw(&pool, 7, "note", (5, 4, i64::from(i32::MAX) + 1, 1), "{}", 6).await;
    insert_raw(&pool, 8, "clock", (7, 1, 1, 1), r#"{"format":"24"}"#, 7).await;

    let loaded = load_dashboard(&pool).await.unwrap();
    let ids: Vec<i64> = loaded.widgets.iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![1, 8]);
    assert_eq!(loaded.widgets[1].data["format"], "24");
}

#[tokio::test]
async fn out_of_range_stored_grid_falls_back_to_default() {
    let pool = test_pool().await;
    sqlx::query("INSERT INTO settings (key, value) VALUES ('theme', ?)")
        .bind(r#"{"gridColumns":0,"gridRows":6}"#)
        .execute(&pool)
        .await
        .unwrap();

    let loaded = load_dashboard(&pool).await.unwrap();
    assert_eq!(loaded.grid_size(), GridSize::new(10, 6));
    assert!(loaded.widgets.is_empty());
}

// =============================================================================
// Flush
// =============================================================================

#[tokio::test]
async fn flush_writes_only_when_dirty() {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), DashboardState::new(vec![widget(1, 1, 1, 1, 1)], Settings::default()));
    assert!(!flush_if_dirty(&state).await.unwrap());

    state.dashboard.write().await.touch();
    assert!(flush_if_dirty(&state).await.unwrap());
    assert!(!state.dashboard.read().await.is_dirty());

    let loaded = load_dashboard(&pool).await.unwrap();
    assert_eq!(loaded.widgets, vec![widget(1, 1, 1, 1, 1)]);
}

#[tokio::test]
async fn failed_flush_stays_dirty() {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), DashboardState::default());
    state.dashboard.write().await.touch();
    pool.close().await;

    let err = flush_if_dirty(&state).await.unwrap_err();
    assert_eq!(err.error_code(), "E_DATABASE");
    assert!(state.dashboard.read().await.is_dirty());
}
