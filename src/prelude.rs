pub use crate::blocks::prelude::*;
pub use crate::concurrent::{LockFreeQueue, PopOutcome, WorkerPool};
pub use crate::error::{MapIndexError, Result};
pub use crate::index::{BoundingBox, Coordinate, EntryKind, IndexEntry, OsmAddress, Quadrant, Quadtree};
pub use crate::io::prelude::*;
pub use crate::pointer::RelPtr;
