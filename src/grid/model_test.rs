use super::*;

fn grid() -> GridSize {
    GridSize::new(10, 6)
}

fn placed(id: ItemId, x: i32, y: i32, cols: i32, rows: i32) -> Placed {
    Placed { id, rect: Rect::new(x, y, cols, rows) }
}

// =============================================================================
// Geometry
// =============================================================================

#[test]
fn rects_intersect_is_half_open() {
    let a = Rect::new(1, 1, 2, 2);
    assert!(rects_intersect(a, Rect::new(2, 2, 1, 1)));
    assert!(!rects_intersect(a, Rect::new(3, 1, 1, 1)));
    assert!(!rects_intersect(a, Rect::new(1, 3, 2, 2)));
}

#[test]
fn rect_contains_requires_full_inclusion() {
    let outer = Rect::new(5, 1, 2, 2);
    assert!(outer.contains(Rect::new(5, 1, 1, 1)));
    assert!(outer.contains(Rect::new(6, 2, 1, 1)));
    assert!(!outer.contains(Rect::new(5, 1, 3, 1)));
    assert!(!outer.contains(Rect::new(4, 1, 1, 1)));
}

#[test]
fn grid_size_contains_checks_every_edge() {
    let size = grid();
    assert!(size.contains(Rect::new(1, 1, 10, 6)));
    assert!(size.contains(Rect::new(9, 5, 2, 2)));
    assert!(!size.contains(Rect::new(10, 6, 2, 2)));
    assert!(!size.contains(Rect::new(0, 1, 1, 1)));
    assert!(!size.contains(Rect::new(1, 1, 0, 1)));
}

#[test]
fn rect_geometry_does_not_overflow() {
    let huge = Rect::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX);
    assert!(!grid().contains(huge));
    assert!(!rects_intersect(huge, Rect::new(1, 1, 1, 1)));
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn construction_clips_out_of_bounds_cells() {
    let items = [placed(1, 9, 5, 4, 4), placed(2, -3, -3, 2, 2)];
    let model = GridModel::new(grid(), &items);
    assert!(!model.is_area_free(9, 5, 2, 2, None));
    assert!(model.is_area_free(1, 1, 2, 2, None));
    assert_eq!(model.item(2).map(|p| p.id), Some(2));
}

#[test]
fn construction_ignores_empty_footprints() {
    let items = [placed(1, 1, 1, 0, 3), placed(2, 2, 2, 2, -1)];
    let model = GridModel::new(grid(), &items);
    assert!(model.is_area_free(1, 1, 10, 6, None));
}

#[test]
fn is_in_bounds_is_zero_based() {
    let model = GridModel::new::<Placed, _>(grid(), &[]);
    assert!(model.is_in_bounds(0, 0));
    assert!(model.is_in_bounds(9, 5));
    assert!(!model.is_in_bounds(10, 5));
    assert!(!model.is_in_bounds(0, 6));
    assert!(!model.is_in_bounds(-1, 0));
}

// =============================================================================
// Area queries
// =============================================================================

#[test]
fn area_outside_grid_is_never_free() {
    let model = GridModel::new::<Placed, _>(grid(), &[]);
    assert!(!model.is_area_free(10, 6, 2, 1, None));
    assert!(!model.is_area_free(0, 1, 1, 1, None));
}

#[test]
fn occupancy_round_trip() {
    let items = [placed(1, 1, 1, 2, 2), placed(2, 5, 3, 3, 1), placed(3, 10, 6, 1, 1)];
    let model = GridModel::new(grid(), &items);
    for item in &items {
        let r = item.rect;
        for y in r.y..r.y + r.rows {
            for x in r.x..r.x + r.cols {
                assert!(!model.is_area_free(x, y, 1, 1, None), "cell ({x},{y}) should be occupied");
                assert!(model.is_area_free(x, y, 1, 1, Some(item.id)));
            }
        }
        assert!(model.is_area_free(r.x, r.y, r.cols, r.rows, Some(item.id)));
    }
}

#[test]
fn items_in_area_is_distinct_and_row_major() {
    let items = [placed(7, 3, 2, 2, 2), placed(4, 1, 1, 3, 1), placed(9, 1, 3, 1, 1)];
    let model = GridModel::new(grid(), &items);
    let found = model.items_in_area(1, 1, 4, 3, None);
    let ids = found.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![4, 7, 9]);
}

#[test]
fn items_in_area_skips_ignored_item() {
    let items = [placed(1, 1, 1, 2, 2), placed(2, 3, 1, 1, 1)];
    let model = GridModel::new(grid(), &items);
    let ids = model.items_in_area(1, 1, 3, 1, Some(1)).iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![2]);
}

#[test]
fn items_in_area_clips_to_grid() {
    let items = [placed(1, 10, 6, 1, 1)];
    let model = GridModel::new(grid(), &items);
    let found = model.items_in_area(9, 5, 100, 100, None);
    assert_eq!(found.len(), 1);
}

// =============================================================================
// Slot search
// =============================================================================

#[test]
fn find_empty_slot_scans_row_major() {
    let items = [placed(1, 1, 1, 2, 2)];
    let model = GridModel::new(grid(), &items);
    assert_eq!(model.find_empty_slot(2, 2), Some((3, 1)));
    assert_eq!(model.find_empty_slot(10, 1), Some((1, 3)));
}

#[test]
fn find_empty_slot_returns_none_when_full() {
    let items = [placed(1, 1, 1, 10, 6)];
    let model = GridModel::new(grid(), &items);
    assert_eq!(model.find_empty_slot(1, 1), None);
    let empty = GridModel::new::<Placed, _>(grid(), &[]);
    assert_eq!(empty.find_empty_slot(11, 1), None);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn validate_layout_accepts_valid_layout() {
    let items = [placed(1, 1, 1, 2, 2), placed(2, 3, 1, 2, 2)];
    assert_eq!(validate_layout(grid(), &items), Ok(()));
}

#[test]
fn validate_layout_reports_first_violation() {
    assert_eq!(validate_layout(grid(), &[placed(1, 1, 1, 0, 1)]), Err(LayoutViolation::EmptySize(1)));
    assert_eq!(validate_layout(grid(), &[placed(1, 10, 1, 2, 1)]), Err(LayoutViolation::OutOfBounds(1)));
    assert_eq!(
        validate_layout(grid(), &[placed(1, 1, 1, 2, 2), placed(2, 2, 2, 1, 1)]),
        Err(LayoutViolation::Overlap { a: 1, b: 2 })
    );
    assert_eq!(
        validate_layout(grid(), &[placed(1, 1, 1, 1, 1), placed(1, 5, 5, 1, 1)]),
        Err(LayoutViolation::DuplicateId(1))
    );
}
