//! Persistent spatial index: data model, on-disk records, and the
//! concurrent quadtree builder (C9).

pub mod model;
pub mod quadtree;
pub mod record;

pub use model::{BoundingBox, Coordinate, EntryKind, IndexEntry, OsmAddress, Quadrant};
pub use quadtree::Quadtree;
