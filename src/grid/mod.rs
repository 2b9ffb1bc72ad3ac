//! Grid occupancy and rearrangement engine.
//!
//! ARCHITECTURE
//! ============
//! The dashboard is a fixed `cols x rows` grid of non-overlapping widget
//! rectangles. Everything in this module is pure and synchronous: callers
//! hand in the current item list and get back verdicts, previews, and commit
//! batches. Nothing here touches shared state, so a query can run once per
//! animation frame without locking beyond the caller's own snapshot.
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Occupancy snapshot, geometry, layout validation |
//! | [`resolver`] | Move verdicts: free move, bounding-box swap, reverse clearance |
//! | [`session`] | Drag/resize gesture controller and atomic commits |

pub mod model;
pub mod resolver;
pub mod session;

pub use model::{GridItem, GridModel, GridSize, ItemId, Placeable, Placed, Rect};
pub use resolver::{MoveResult, resolve_move};
pub use session::{Commit, DragMode, DragSession, GridMetrics, Point, Preview, apply_commit};
