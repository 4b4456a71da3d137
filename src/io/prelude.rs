pub use crate::io::alloc::Alloc;
pub use crate::io::blob::{Blob, BlobData, BlobHeader, BlobType};
pub use crate::io::blob_stream::BlobStream;
pub use crate::io::mmap_file::MappedFile;
pub use crate::io::pbf_adapter::{
    CompressionKind, Decompressor, NoopDecompressor, NoopPrimitiveBlockDecoder, PrimitiveBlockDecoder,
};
