//! On-disk layout of quadtree squares and entry-chain nodes (C9, §3).
//!
//! `QuadSquareRecord` and `EntryNodeRecord` are `#[repr(C)]`: their field
//! offsets are part of the persistent format, since [`RelPtr::set`] and
//! [`RelPtr::target_offset`] need the exact file offset of the pointer
//! field itself, not just the offset of the containing record. Field
//! offsets are read with `std::mem::offset_of!` rather than hand-kept
//! constants, so the two never drift apart.
//!
//! Neither record implements `Drop`; both are written into mapped memory
//! with a plain assignment (`Alloc::emplace`), which would be unsound if
//! dropping the previous (garbage) bytes had any effect.

use std::sync::atomic::AtomicU32;

use crate::index::model::{BoundingBox, Coordinate, EntryKind, IndexEntry, OsmAddress};
use crate::pointer::RelPtr;

/// A box in the persistent layout: four `i64` nano-degree ordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct BoxRecord {
    pub sw_lat: i64,
    pub sw_lon: i64,
    pub ne_lat: i64,
    pub ne_lon: i64,
}

impl From<BoundingBox> for BoxRecord {
    fn from(b: BoundingBox) -> Self {
        BoxRecord {
            sw_lat: b.sw.lat,
            sw_lon: b.sw.lon,
            ne_lat: b.ne.lat,
            ne_lon: b.ne.lon,
        }
    }
}

impl From<BoxRecord> for BoundingBox {
    fn from(r: BoxRecord) -> Self {
        BoundingBox {
            sw: Coordinate::new(r.sw_lat, r.sw_lon),
            ne: Coordinate::new(r.ne_lat, r.ne_lon),
        }
    }
}

const ENTRY_KIND_LINE: u8 = 0;
const ENTRY_KIND_POLYGON: u8 = 1;
const ENTRY_KIND_LABEL: u8 = 2;
const ENTRY_KIND_WIDGET: u8 = 3;

fn kind_to_tag(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Line => ENTRY_KIND_LINE,
        EntryKind::Polygon => ENTRY_KIND_POLYGON,
        EntryKind::Label => ENTRY_KIND_LABEL,
        EntryKind::Widget => ENTRY_KIND_WIDGET,
    }
}

fn tag_to_kind(tag: u8) -> EntryKind {
    match tag {
        ENTRY_KIND_POLYGON => EntryKind::Polygon,
        ENTRY_KIND_LABEL => EntryKind::Label,
        ENTRY_KIND_WIDGET => EntryKind::Widget,
        _ => EntryKind::Line,
    }
}

/// The persistent form of an [`IndexEntry`], plus the relative pointer that
/// chains it to the next entry in its owning leaf's list (§3, I1/I3).
#[repr(C)]
pub struct EntryNodeRecord {
    pub kind: u8,
    pub has_address: u8,
    _pad0: [u8; 6],
    pub bounds: BoxRecord,
    pub address_blob_pos: u64,
    pub address_item_pos: i32,
    _pad1: [u8; 4],
    pub reduction_detail: u64,
    pub next: RelPtr<EntryNodeRecord>,
}

impl EntryNodeRecord {
    pub fn from_entry(entry: &IndexEntry) -> Self {
        let (has_address, blob_pos, item_pos) = match entry.address {
            Some(OsmAddress { blob_pos, item_pos }) => (1, blob_pos, item_pos),
            None => (0, 0, 0),
        };
        EntryNodeRecord {
            kind: kind_to_tag(entry.kind),
            has_address,
            _pad0: [0; 6],
            bounds: entry.bounds.into(),
            address_blob_pos: blob_pos,
            address_item_pos: item_pos,
            _pad1: [0; 4],
            reduction_detail: entry.reduction_detail,
            next: RelPtr::null(),
        }
    }

    pub fn to_entry(&self) -> IndexEntry {
        IndexEntry {
            kind: tag_to_kind(self.kind),
            bounds: self.bounds.into(),
            address: if self.has_address != 0 {
                Some(OsmAddress {
                    blob_pos: self.address_blob_pos,
                    item_pos: self.address_item_pos,
                })
            } else {
                None
            },
            reduction_detail: self.reduction_detail,
        }
    }
}

/// The persistent quadtree node (§3). A node is a leaf iff all four child
/// pointers are null; `entry_count` tracks the length of the chain rooted
/// at `entries_head` so overflow (I3) can be checked without walking it.
#[repr(C)]
pub struct QuadSquareRecord {
    pub bounds: BoxRecord,
    pub nw: RelPtr<QuadSquareRecord>,
    pub ne: RelPtr<QuadSquareRecord>,
    pub sw: RelPtr<QuadSquareRecord>,
    pub se: RelPtr<QuadSquareRecord>,
    pub entries_head: RelPtr<EntryNodeRecord>,
    pub entry_count: AtomicU32,
    _pad: [u8; 4],
}

impl QuadSquareRecord {
    pub fn new_leaf(bounds: BoundingBox) -> Self {
        QuadSquareRecord {
            bounds: bounds.into(),
            nw: RelPtr::null(),
            ne: RelPtr::null(),
            sw: RelPtr::null(),
            se: RelPtr::null(),
            entries_head: RelPtr::null(),
            entry_count: AtomicU32::new(0),
            _pad: [0; 4],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.nw.is_null() && self.ne.is_null() && self.sw.is_null() && self.se.is_null()
    }
}
