//! Retained OSM PBF data model: header, string table, and primitive
//! blocks (§3 ambient data model). Unchanged in shape; the indexing core
//! never interprets these beyond handing them to the injected
//! [`crate::io::pbf_adapter::PrimitiveBlockDecoder`].

pub mod header_block;
pub mod nano_degree;
pub mod primitives;
pub mod string_table;

pub mod prelude {
    pub use super::header_block::{HeaderBBox, HeaderBlock, OsmosisReplicationTimestamp, OsmosisSequenceNumber};
    pub use super::nano_degree::NanoDegree;
    pub use super::primitives::*;
    pub use super::string_table::StringTable;
}

pub use header_block::{HeaderBBox, HeaderBlock, OsmosisReplicationTimestamp, OsmosisSequenceNumber};
pub use nano_degree::NanoDegree;
pub use string_table::StringTable;
