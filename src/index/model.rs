//! In-memory spatial data model (§3): the shapes callers build before
//! handing entries to [`crate::index::quadtree::Quadtree::insert`].

/// Nano-degree angular ordinate (10⁻⁹ degree), OSM's native coordinate
/// precision.
pub type Ordinate = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub lat: Ordinate,
    pub lon: Ordinate,
}

impl Coordinate {
    pub fn new(lat: Ordinate, lon: Ordinate) -> Self {
        Coordinate { lat, lon }
    }
}

/// An axis-aligned box; construction enforces `sw.lat <= ne.lat` and
/// `sw.lon <= ne.lon` (I, §3 — empty boxes are forbidden).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub sw: Coordinate,
    pub ne: Coordinate,
}

impl BoundingBox {
    pub fn new(sw: Coordinate, ne: Coordinate) -> Option<Self> {
        if sw.lat <= ne.lat && sw.lon <= ne.lon {
            Some(BoundingBox { sw, ne })
        } else {
            None
        }
    }

    /// Midpoint, per (I2)/§4.9: `(sw.lat+ne.lat)/2` and `(sw.lon+ne.lon)/2`.
    /// Integer division floors toward the sw corner, which is what makes
    /// quadrant assignment deterministic on boundary values.
    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: midpoint(self.sw.lat, self.ne.lat),
            lon: midpoint(self.sw.lon, self.ne.lon),
        }
    }

    /// The (I2) quadrant of this box, split at its own center.
    pub fn quadrant(&self, which: Quadrant) -> BoundingBox {
        let mid = self.center();
        match which {
            Quadrant::Nw => BoundingBox {
                sw: Coordinate::new(mid.lat, self.sw.lon),
                ne: Coordinate::new(self.ne.lat, mid.lon),
            },
            Quadrant::Ne => BoundingBox {
                sw: Coordinate::new(mid.lat, mid.lon),
                ne: self.ne,
            },
            Quadrant::Sw => BoundingBox {
                sw: self.sw,
                ne: Coordinate::new(mid.lat, mid.lon),
            },
            Quadrant::Se => BoundingBox {
                sw: Coordinate::new(self.sw.lat, mid.lon),
                ne: Coordinate::new(mid.lat, self.ne.lon),
            },
        }
    }

    pub fn contains_point(&self, p: Coordinate) -> bool {
        p.lat >= self.sw.lat && p.lat <= self.ne.lat && p.lon >= self.sw.lon && p.lon <= self.ne.lon
    }
}

fn midpoint(a: i64, b: i64) -> i64 {
    // Avoids overflow for the full nano-degree range and floors toward `a`.
    a + (b - a) / 2
}

/// Which quadrant an entry's center falls into, relative to a square's
/// midlines. The deterministic tie-break on boundary values: `>= mid` goes
/// to the north/east side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Quadrant {
    pub fn containing(center: Coordinate, mid: Coordinate) -> Quadrant {
        match (center.lat >= mid.lat, center.lon >= mid.lon) {
            (true, false) => Quadrant::Nw,
            (true, true) => Quadrant::Ne,
            (false, false) => Quadrant::Sw,
            (false, true) => Quadrant::Se,
        }
    }

    pub const ALL: [Quadrant; 4] = [Quadrant::Nw, Quadrant::Ne, Quadrant::Sw, Quadrant::Se];
}

/// `{blob_pos, item_pos}` identifying a primitive inside the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsmAddress {
    pub blob_pos: u64,
    pub item_pos: i32,
}

/// The polymorphic kind of an index entry; no dynamic dispatch is needed
/// for indexing (kind is consulted at render time, outside this crate's
/// scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Line,
    Polygon,
    Label,
    Widget,
}

/// `{kind, bounds, address, reduction_detail}` (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub kind: EntryKind,
    pub bounds: BoundingBox,
    pub address: Option<OsmAddress>,
    /// Zero means "no generated detail"; otherwise a relative offset to a
    /// generated/approximated replacement object.
    pub reduction_detail: u64,
}
