//! Placement resolver: decides whether a widget can move to a new cell.
//!
//! DESIGN
//! ======
//! `resolve_move` produces exactly one deterministic verdict per query. The
//! cases are tried in order and the first one that succeeds wins:
//!
//! 0. Bounds: the source rectangle at the target must stay on the grid.
//! A. Free move: nothing else occupies the destination.
//! B. Bounding-box swap: every collider sits fully inside the destination.
//!    The colliders move as a rigid group into the space the source vacates,
//!    keeping their relative layout.
//! C. Reverse clearance: a single collider (usually a bigger widget, or a
//!    contained one whose group swap would stack onto the source) is pushed
//!    to the mirrored offset, or snapped onto the source's old position, and
//!    the source takes the first free corner of the collider's old footprint.
//!
//! Rejections are ordinary results (`bounds` / `collision`), never errors.
//!
//! TRADE-OFFS
//! ==========
//! Case C probes four fixed corner candidates instead of searching the whole
//! grid. This runs once per animation frame during a drag, so it stays
//! bounded; it can report `collision` for very lopsided size ratios where a
//! placement exists elsewhere.

use serde::{Serialize, Serializer};

use super::model::{GridItem, GridModel, ItemId, Placed, Rect, rects_intersect};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Move,
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// The source would leave the grid at the target position.
    Bounds,
    /// No resolution found for the colliders.
    Collision,
}

/// A secondary item that has to move so the source can land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Displacement {
    pub id: ItemId,
    pub cols: i32,
    pub rows: i32,
    pub new_x: i32,
    pub new_y: i32,
}

impl Displacement {
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.new_x, self.new_y, self.cols, self.rows)
    }
}

/// Verdict for one placement query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    Possible { kind: MoveKind, target_x: i32, target_y: i32, displaced: Vec<Displacement> },
    Rejected(RejectReason),
}

impl MoveResult {
    #[must_use]
    pub fn is_possible(&self) -> bool {
        matches!(self, Self::Possible { .. })
    }

    /// Resolved top-left for the source, if the move is possible.
    #[must_use]
    pub fn target(&self) -> Option<(i32, i32)> {
        match self {
            Self::Possible { target_x, target_y, .. } => Some((*target_x, *target_y)),
            Self::Rejected(_) => None,
        }
    }

    #[must_use]
    pub fn displaced(&self) -> &[Displacement] {
        match self {
            Self::Possible { displaced, .. } => displaced,
            Self::Rejected(_) => &[],
        }
    }
}

/// Wire shape: `{possible, reason?, type?, targetX?, targetY?, displaced}`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveResultWire<'a> {
    possible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<RejectReason>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<MoveKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_y: Option<i32>,
    displaced: &'a [Displacement],
}

impl Serialize for MoveResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Possible { kind, target_x, target_y, displaced } => MoveResultWire {
                possible: true,
                reason: None,
                kind: Some(*kind),
                target_x: Some(*target_x),
                target_y: Some(*target_y),
                displaced,
            },
            Self::Rejected(reason) => MoveResultWire {
                possible: false,
                reason: Some(*reason),
                kind: None,
                target_x: None,
                target_y: None,
                displaced: &[],
            },
        };
        wire.serialize(serializer)
    }
}

/// One proposed relocation checked by [`can_fit_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposedMove {
    pub item: Placed,
    pub new_x: i32,
    pub new_y: i32,
}

impl ProposedMove {
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.item.rect.at(self.new_x, self.new_y)
    }

    fn displacement(&self) -> Displacement {
        Displacement {
            id: self.item.id,
            cols: self.item.rect.cols,
            rows: self.item.rect.rows,
            new_x: self.new_x,
            new_y: self.new_y,
        }
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Decide how (and whether) `source` can move its top-left to `(target_x, target_y)`.
#[must_use]
pub fn resolve_move(model: &GridModel, source: &impl GridItem, target_x: i32, target_y: i32) -> MoveResult {
    let source = Placed::of(source);
    let dest = source.rect.at(target_x, target_y);

    if !model.size().contains(dest) {
        return MoveResult::Rejected(RejectReason::Bounds);
    }

    let collisions = model.items_in_area(dest.x, dest.y, dest.cols, dest.rows, Some(source.id));
    if collisions.is_empty() {
        return MoveResult::Possible { kind: MoveKind::Move, target_x, target_y, displaced: Vec::new() };
    }

    if collisions.iter().all(|c| dest.contains(c.rect)) {
        if let Some(result) = bounding_box_swap(model, source, dest, &collisions) {
            return result;
        }
    }

    if let [big] = collisions.as_slice() {
        if let Some(result) = reverse_clearance(model, source, dest, *big) {
            return result;
        }
    }

    MoveResult::Rejected(RejectReason::Collision)
}

/// Every move must land in bounds on cells that are empty or owned by one of
/// `ignore_ids` (the items being relocated together).
#[must_use]
pub fn can_fit_at(model: &GridModel, moves: &[ProposedMove], ignore_ids: &[ItemId]) -> bool {
    moves.iter().all(|m| {
        let rect = m.rect();
        model.size().contains(rect)
            && model
                .items_in_area(rect.x, rect.y, rect.cols, rect.rows, None)
                .iter()
                .all(|obstacle| ignore_ids.contains(&obstacle.id))
    })
}

/// Case B. Colliders keep their offsets from their own bounding box and are
/// re-anchored at the source's old top-left.
fn bounding_box_swap(model: &GridModel, source: Placed, dest: Rect, collisions: &[Placed]) -> Option<MoveResult> {
    let min_x = collisions.iter().map(|c| c.rect.x).min()?;
    let min_y = collisions.iter().map(|c| c.rect.y).min()?;

    let proposed = collisions
        .iter()
        .map(|c| {
            Some(ProposedMove {
                item: *c,
                new_x: shift(source.rect.x, i64::from(c.rect.x) - i64::from(min_x))?,
                new_y: shift(source.rect.y, i64::from(c.rect.y) - i64::from(min_y))?,
            })
        })
        .collect::<Option<Vec<_>>>()?;

    let mut ignore_ids = Vec::with_capacity(collisions.len() + 1);
    ignore_ids.push(source.id);
    ignore_ids.extend(collisions.iter().map(|c| c.id));

    if !can_fit_at(model, &proposed, &ignore_ids) {
        return None;
    }

    // Displaced items must not land on the source's new footprint.
    if proposed.iter().any(|m| rects_intersect(m.rect(), dest)) {
        return None;
    }

    Some(MoveResult::Possible {
        kind: MoveKind::Swap,
        target_x: dest.x,
        target_y: dest.y,
        displaced: proposed.iter().map(ProposedMove::displacement).collect(),
    })
}

/// Case C. The source displaces exactly one collider.
fn reverse_clearance(model: &GridModel, source: Placed, dest: Rect, big: Placed) -> Option<MoveResult> {
    let ignore_ids = [source.id, big.id];

    let offset_x = i64::from(dest.x) - i64::from(big.rect.x);
    let offset_y = i64::from(dest.y) - i64::from(big.rect.y);
    let mirrored = shift(source.rect.x, -offset_x)
        .zip(shift(source.rect.y, -offset_y))
        .map(|(new_x, new_y)| ProposedMove { item: big, new_x, new_y });
    let strict = ProposedMove { item: big, new_x: source.rect.x, new_y: source.rect.y };

    let big_move = mirrored
        .filter(|m| can_fit_at(model, &[*m], &ignore_ids))
        .or_else(|| can_fit_at(model, &[strict], &ignore_ids).then_some(strict))?;
    let big_new = big_move.rect();

    let bottom = i64::from(big.rect.rows) - i64::from(source.rect.rows);
    let right = i64::from(big.rect.cols) - i64::from(source.rect.cols);
    let corners = [
        Some((big.rect.x, big.rect.y)),
        shift(big.rect.y, bottom).map(|y| (big.rect.x, y)),
        shift(big.rect.x, right).map(|x| (x, big.rect.y)),
        shift(big.rect.x, right).zip(shift(big.rect.y, bottom)),
    ];

    let mut candidates: Vec<(i32, i32)> = Vec::with_capacity(corners.len());
    for corner in corners.into_iter().flatten() {
        if !candidates.contains(&corner) {
            candidates.push(corner);
        }
    }

    candidates.into_iter().find_map(|(x, y)| {
        let landing = ProposedMove { item: source, new_x: x, new_y: y };
        if rects_intersect(landing.rect(), big_new) || !can_fit_at(model, &[landing], &ignore_ids) {
            return None;
        }
        Some(MoveResult::Possible {
            kind: MoveKind::Swap,
            target_x: x,
            target_y: y,
            displaced: vec![big_move.displacement()],
        })
    })
}

/// `base + delta`, or `None` if the result leaves `i32`.
fn shift(base: i32, delta: i64) -> Option<i32> {
    i32::try_from(i64::from(base) + delta).ok()
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
