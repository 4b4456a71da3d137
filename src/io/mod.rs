//! Mapped-file I/O: random access, bump allocation, and OSM PBF framing
//! (C1, C2, C5, C6).

pub mod alloc;
pub mod blob;
pub mod blob_stream;
pub mod mmap_file;
pub mod pbf_adapter;
pub mod prelude;

pub use alloc::Alloc;
pub use blob::{Blob, BlobData, BlobHeader, BlobType};
pub use blob_stream::BlobStream;
pub use mmap_file::MappedFile;
pub use pbf_adapter::{
    decode_blob, decode_blob_header, CompressionKind, Decompressor, NoopDecompressor,
    NoopPrimitiveBlockDecoder, PrimitiveBlockDecoder,
};
