//! Occupancy snapshot of the widget grid.
//!
//! DESIGN
//! ======
//! `GridModel` is built fresh from the live item list for every query and
//! discarded afterwards. It maps each cell to the id of the item covering it.
//! Grid coordinates are 1-based (`x`, `y`); cell coordinates inside the
//! occupancy table are 0-based.
//!
//! EDGE CASES
//! ==========
//! Construction never fails. Cells that fall outside the grid are clipped,
//! and an item with a non-positive size simply has no footprint. Geometry is
//! computed in `i64` so hostile coordinates cannot overflow.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Stable widget identifier.
pub type ItemId = i64;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Axis-aligned rectangle in 1-based grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub cols: i32,
    pub rows: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, cols: i32, rows: i32) -> Self {
        Self { x, y, cols, rows }
    }

    /// Same size, new top-left corner.
    #[must_use]
    pub const fn at(self, x: i32, y: i32) -> Self {
        Self { x, y, cols: self.cols, rows: self.rows }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn end_x(self) -> i64 {
        i64::from(self.x) + i64::from(self.cols)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn end_y(self) -> i64 {
        i64::from(self.y) + i64::from(self.rows)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.cols < 1 || self.rows < 1
    }

    /// Whether `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains(self, other: Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.end_x() <= self.end_x() && other.end_y() <= self.end_y()
    }

    #[must_use]
    pub fn intersects(self, other: Rect) -> bool {
        rects_intersect(self, other)
    }
}

/// Half-open overlap test between two rectangles.
#[must_use]
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    i64::from(a.x) < b.end_x() && a.end_x() > i64::from(b.x) && i64::from(a.y) < b.end_y() && a.end_y() > i64::from(b.y)
}

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub cols: i32,
    pub rows: i32,
}

impl GridSize {
    #[must_use]
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    /// Whether a non-empty `rect` lies fully within `[1, cols] x [1, rows]`.
    #[must_use]
    pub fn contains(self, rect: Rect) -> bool {
        !rect.is_empty()
            && rect.x >= 1
            && rect.y >= 1
            && rect.end_x() - 1 <= i64::from(self.cols)
            && rect.end_y() - 1 <= i64::from(self.rows)
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Anything that occupies a rectangle on the grid.
pub trait GridItem {
    fn id(&self) -> ItemId;
    fn rect(&self) -> Rect;
}

/// Items whose position can be rewritten by a commit.
pub trait Placeable: GridItem {
    fn place(&mut self, rect: Rect);
}

/// Id + rectangle pair, the engine's own view of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub id: ItemId,
    pub rect: Rect,
}

impl Placed {
    #[must_use]
    pub fn of(item: &impl GridItem) -> Self {
        Self { id: item.id(), rect: item.rect() }
    }
}

impl GridItem for Placed {
    fn id(&self) -> ItemId {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }
}

impl Placeable for Placed {
    fn place(&mut self, rect: Rect) {
        self.rect = rect;
    }
}

// =============================================================================
// GRID MODEL
// =============================================================================

/// Read-only occupancy table for one query.
#[derive(Debug, Clone)]
pub struct GridModel {
    size: GridSize,
    width: usize,
    cells: Vec<Option<ItemId>>,
    items: HashMap<ItemId, Placed>,
}

impl GridModel {
    /// Build the occupancy table. Out-of-bounds cells are dropped silently.
    pub fn new<'a, T, I>(size: GridSize, items: I) -> Self
    where
        T: GridItem + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let width = usize::try_from(size.cols).unwrap_or(0);
        let height = usize::try_from(size.rows).unwrap_or(0);
        let mut model = Self { size, width, cells: vec![None; width * height], items: HashMap::new() };

        for item in items {
            let placed = Placed::of(item);
            for index in model.clipped_cells(placed.rect) {
                model.cells[index] = Some(placed.id);
            }
            model.items.insert(placed.id, placed);
        }

        model
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Reverse lookup from id to item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<Placed> {
        self.items.get(&id).copied()
    }

    /// 0-based cell bounds check.
    #[must_use]
    pub fn is_in_bounds(&self, cell_x: i64, cell_y: i64) -> bool {
        cell_x >= 0 && cell_x < i64::from(self.size.cols) && cell_y >= 0 && cell_y < i64::from(self.size.rows)
    }

    /// True only if every cell of the area is inside the grid and either
    /// empty or owned by `ignore_id`.
    #[must_use]
    pub fn is_area_free(&self, x: i32, y: i32, w: i32, h: i32, ignore_id: Option<ItemId>) -> bool {
        let area = Rect::new(x, y, w, h);
        if area.is_empty() {
            return true;
        }
        if !self.is_in_bounds(i64::from(x) - 1, i64::from(y) - 1) || !self.is_in_bounds(area.end_x() - 2, area.end_y() - 2)
        {
            return false;
        }

        self.clipped_cells(area)
            .all(|index| self.cells[index].is_none_or(|id| Some(id) == ignore_id))
    }

    /// Distinct items intersecting the area, in row-major first-encounter
    /// order, excluding `ignore_id`.
    #[must_use]
    pub fn items_in_area(&self, x: i32, y: i32, w: i32, h: i32, ignore_id: Option<ItemId>) -> Vec<Placed> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for index in self.clipped_cells(Rect::new(x, y, w, h)) {
            let Some(id) = self.cells[index] else {
                continue;
            };
            if Some(id) == ignore_id || !seen.insert(id) {
                continue;
            }
            if let Some(item) = self.items.get(&id) {
                found.push(*item);
            }
        }

        found
    }

    /// First top-left position (row-major) where a `w x h` item fits.
    #[must_use]
    pub fn find_empty_slot(&self, w: i32, h: i32) -> Option<(i32, i32)> {
        for y in 1..=self.size.rows {
            for x in 1..=self.size.cols {
                if !self.size.contains(Rect::new(x, y, w, h)) {
                    continue;
                }
                if self.is_area_free(x, y, w, h, None) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Table indices of the cells of `rect` that lie inside the grid,
    /// in row-major order.
    fn clipped_cells(&self, rect: Rect) -> impl Iterator<Item = usize> + use<> {
        let cols = i64::from(self.size.cols);
        let rows = i64::from(self.size.rows);
        let x0 = (i64::from(rect.x) - 1).max(0);
        let x1 = (rect.end_x() - 1).min(cols);
        let y0 = (i64::from(rect.y) - 1).max(0);
        let y1 = (rect.end_y() - 1).min(rows);
        let width = self.width;

        (y0..y1).flat_map(move |cy| {
            (x0..x1).filter_map(move |cx| {
                let cx = usize::try_from(cx).ok()?;
                let cy = usize::try_from(cy).ok()?;
                Some(cy * width + cx)
            })
        })
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// A broken layout invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LayoutViolation {
    #[error("item {0} has an empty footprint")]
    EmptySize(ItemId),
    #[error("item {0} lies outside the grid")]
    OutOfBounds(ItemId),
    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),
    #[error("items {a} and {b} overlap")]
    Overlap { a: ItemId, b: ItemId },
}

/// Check positive size, grid bounds, unique ids, and pairwise non-overlap.
/// Returns the first violation in list order.
///
/// # Errors
///
/// Returns the first [`LayoutViolation`] found.
pub fn validate_layout<T: GridItem>(size: GridSize, items: &[T]) -> Result<(), LayoutViolation> {
    let mut checked: Vec<Placed> = Vec::with_capacity(items.len());

    for item in items {
        let placed = Placed::of(item);
        if placed.rect.is_empty() {
            return Err(LayoutViolation::EmptySize(placed.id));
        }
        if !size.contains(placed.rect) {
            return Err(LayoutViolation::OutOfBounds(placed.id));
        }
        for other in &checked {
            if other.id == placed.id {
                return Err(LayoutViolation::DuplicateId(placed.id));
            }
            if other.rect.intersects(placed.rect) {
                return Err(LayoutViolation::Overlap { a: other.id, b: placed.id });
            }
        }
        checked.push(placed);
    }

    Ok(())
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
