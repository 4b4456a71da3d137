//! Indexer orchestration (C11): wires C1/C5/C6 (input walking), C7/C8
//! (dispatch), and C9 (the quadtree) into the single build pipeline
//! described in §2 and driven by `bin/mapindexer.rs`.
//!
//! Grounded in the original `mapindexer/main.cpp` walk-and-dispatch loop:
//! the main thread walks the blob stream and enqueues one task per data
//! blob; workers decode, extract entries, and insert them into the
//! shared quadtree. Decompression, primitive-block decoding, and
//! geometry-to-index-entry extraction are all injected (§1, §10.3):
//! turning a decoded `PrimitiveBlock` into index entries is itself a
//! rendering-adjacent policy choice (which ways count as polygons, which
//! nodes become labels, reduction/generalization) this crate does not
//! prescribe.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::blocks::primitives::PrimitiveBlock;
use crate::concurrent::{ExceptionHandler, WorkerPool};
use crate::console;
use crate::error::{MapIndexError, Result};
use crate::index::{BoundingBox, Coordinate, IndexEntry, Quadtree};
use crate::io::blob::{Blob, BlobData, BlobType};
use crate::io::blob_stream::BlobStream;
use crate::io::mmap_file::MappedFile;
use crate::io::pbf_adapter::{CompressionKind, Decompressor, PrimitiveBlockDecoder};

/// Turns a decoded [`PrimitiveBlock`] into the index entries it
/// contributes. `blob_pos` is the byte offset of the blob's length
/// prefix, forwarded verbatim into each entry's [`crate::index::OsmAddress`].
pub trait EntryExtractor: Send + Sync {
    fn extract(&self, block: &PrimitiveBlock, blob_pos: u64) -> Vec<IndexEntry>;
}

/// Configuration for a single [`Indexer::build`] run.
#[derive(Debug, Clone, Copy)]
pub struct IndexerConfig {
    /// (I3): leaves are quadrasected once they exceed this many entries.
    pub node_max_items: usize,
    /// Worker thread count, capped by `available_parallelism` regardless.
    pub num_workers: usize,
    /// Spatial extent of the root square. The whole-earth range in
    /// nano-degrees by default.
    pub root_bounds: BoundingBox,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            node_max_items: 64,
            num_workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
            root_bounds: BoundingBox::new(
                Coordinate::new(-90_000_000_000, -180_000_000_000),
                Coordinate::new(90_000_000_000, 180_000_000_000),
            )
            .expect("whole-earth bounds are well-formed"),
        }
    }
}

/// Summary of a completed (or partially completed) build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildReport {
    pub blobs_seen: u64,
    pub blobs_skipped: u64,
    pub entries_indexed: u64,
}

/// Builds a persistent quadtree index from an OSM PBF input file.
pub struct Indexer {
    decoder: Arc<dyn PrimitiveBlockDecoder>,
    decompressor: Arc<dyn Decompressor>,
    extractor: Arc<dyn EntryExtractor>,
    config: IndexerConfig,
}

impl Indexer {
    pub fn new(
        decoder: Arc<dyn PrimitiveBlockDecoder>,
        decompressor: Arc<dyn Decompressor>,
        extractor: Arc<dyn EntryExtractor>,
        config: IndexerConfig,
    ) -> Self {
        Indexer {
            decoder,
            decompressor,
            extractor,
            config,
        }
    }

    /// Streams `input_path`, dispatching one task per `OSMData` blob to a
    /// worker pool and inserting every extracted entry into a quadtree
    /// rooted in `output_path`. Parse failures in a single blob are
    /// logged and that blob is skipped (§4.9); an I/O failure from
    /// allocation or from opening either file is fatal and aborts the
    /// build (§7).
    pub fn build(&self, input_path: &Path, output_path: &Path) -> Result<BuildReport> {
        let input = Arc::new(MappedFile::open(input_path, false, None)?);
        let output = Arc::new(MappedFile::open(output_path, true, None)?);
        let quadtree = Arc::new(Quadtree::new(output, self.config.root_bounds, self.config.node_max_items)?);

        let blobs_seen = Arc::new(AtomicU64::new(0));
        let blobs_skipped = Arc::new(AtomicU64::new(0));
        let entries_indexed = Arc::new(AtomicU64::new(0));
        let fatal_error: Arc<Mutex<Option<MapIndexError>>> = Arc::new(Mutex::new(None));

        let handler_skipped = Arc::clone(&blobs_skipped);
        let handler_fatal = Arc::clone(&fatal_error);
        let on_exception: ExceptionHandler = Arc::new(move |e: MapIndexError| {
            console::err(&format!("blob task failed: {e}"));
            if matches!(e, MapIndexError::Io { .. }) {
                let mut slot = handler_fatal.lock().unwrap_or_else(|e| e.into_inner());
                if slot.is_none() {
                    *slot = Some(e);
                }
            } else {
                handler_skipped.fetch_add(1, Ordering::Relaxed);
            }
        });

        let pool = WorkerPool::new(self.config.num_workers, Some(on_exception));

        for item in BlobStream::new(Arc::clone(&input)) {
            let (header, blob) = match item {
                Ok(pair) => pair,
                Err(e) => {
                    console::err(&format!("failed to read blob framing: {e}"));
                    blobs_skipped.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };
            blobs_seen.fetch_add(1, Ordering::Relaxed);
            if header.blob_type != BlobType::OSMData {
                continue;
            }

            let decoder = Arc::clone(&self.decoder);
            let decompressor = Arc::clone(&self.decompressor);
            let extractor = Arc::clone(&self.extractor);
            let quadtree = Arc::clone(&quadtree);
            let entries_indexed = Arc::clone(&entries_indexed);
            let blob_pos = blob.offset();

            pool.submit(Box::new(move || {
                let raw = decompress_blob(&blob, decompressor.as_ref())?;
                let block = decoder.decode_primitive_block(&raw)?;
                for entry in extractor.extract(&block, blob_pos) {
                    quadtree.insert(entry)?;
                    entries_indexed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            }));
        }

        drop(pool); // joins all workers via Drop

        if let Some(e) = fatal_error.lock().unwrap_or_else(|e| e.into_inner()).take() {
            return Err(e);
        }

        Ok(BuildReport {
            blobs_seen: blobs_seen.load(Ordering::Relaxed),
            blobs_skipped: blobs_skipped.load(Ordering::Relaxed),
            entries_indexed: entries_indexed.load(Ordering::Relaxed),
        })
    }
}

fn decompress_blob(blob: &Blob, decompressor: &dyn Decompressor) -> Result<Vec<u8>> {
    match &blob.data {
        BlobData::Raw(bytes) => Ok(bytes.to_vec()),
        BlobData::ZlibData { compressed, .. } => decompressor.decompress(CompressionKind::Zlib, compressed),
        BlobData::LzmaData { compressed, .. } => decompressor.decompress(CompressionKind::Lzma, compressed),
        BlobData::Bzip2Data { .. } => Err(MapIndexError::Decode(
            "bzip2 blob payloads are not supported".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntryKind, OsmAddress};
    use crate::io::pbf_adapter::{NoopDecompressor, NoopPrimitiveBlockDecoder};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
    }

    fn encode_header(kind: &str, datasize: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.push((1 << 3) | 2);
        encode_varint(kind.len() as u64, &mut out);
        out.extend_from_slice(kind.as_bytes());
        out.push((3 << 3) | 0);
        encode_varint(datasize as u64, &mut out);
        out
    }

    fn encode_raw_blob(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.push((1 << 3) | 2);
        encode_varint(data.len() as u64, &mut out);
        out.extend_from_slice(data);
        out
    }

    fn write_blob(file: &mut impl Write, kind: &str, payload: &[u8]) {
        let blob_bytes = encode_raw_blob(payload);
        let header_bytes = encode_header(kind, blob_bytes.len() as u32);
        file.write_all(&(header_bytes.len() as u32).to_be_bytes()).unwrap();
        file.write_all(&header_bytes).unwrap();
        file.write_all(&blob_bytes).unwrap();
    }

    struct NoEntries;
    impl EntryExtractor for NoEntries {
        fn extract(&self, _block: &PrimitiveBlock, _blob_pos: u64) -> Vec<IndexEntry> {
            Vec::new()
        }
    }

    struct OneLabelPerBlob;
    impl EntryExtractor for OneLabelPerBlob {
        fn extract(&self, _block: &PrimitiveBlock, blob_pos: u64) -> Vec<IndexEntry> {
            vec![IndexEntry {
                kind: EntryKind::Label,
                bounds: BoundingBox::new(Coordinate::new(0, 0), Coordinate::new(0, 0)).unwrap(),
                address: Some(OsmAddress { blob_pos, item_pos: 0 }),
                reduction_detail: 0,
            }]
        }
    }

    fn config() -> IndexerConfig {
        IndexerConfig {
            node_max_items: 4,
            num_workers: 2,
            ..IndexerConfig::default()
        }
    }

    #[test]
    fn build_fails_cleanly_when_the_decoder_rejects_every_blob() {
        let input = NamedTempFile::new().unwrap();
        {
            let mut f = input.reopen().unwrap();
            write_blob(&mut f, "OSMHeader", b"head");
            write_blob(&mut f, "OSMData", b"data-payload");
        }
        let output = NamedTempFile::new().unwrap();
        std::fs::remove_file(output.path()).unwrap();

        let indexer = Indexer::new(
            Arc::new(NoopPrimitiveBlockDecoder),
            Arc::new(NoopDecompressor),
            Arc::new(NoEntries),
            config(),
        );

        let report = indexer.build(input.path(), output.path()).unwrap();
        assert_eq!(report.blobs_seen, 2);
        assert_eq!(report.blobs_skipped, 1); // only the OSMData blob is dispatched
        assert_eq!(report.entries_indexed, 0);
    }

    struct AlwaysEmptyBlock;
    impl PrimitiveBlockDecoder for AlwaysEmptyBlock {
        fn decode_header<'a>(&self, _bytes: &'a [u8]) -> Result<crate::blocks::header_block::HeaderBlock<'a>> {
            Ok(crate::blocks::header_block::HeaderBlock::default())
        }
        fn decode_primitive_block(&self, _bytes: &[u8]) -> Result<PrimitiveBlock> {
            Ok(PrimitiveBlock::default())
        }
    }

    #[test]
    fn build_indexes_one_entry_per_data_blob() {
        let input = NamedTempFile::new().unwrap();
        {
            let mut f = input.reopen().unwrap();
            write_blob(&mut f, "OSMHeader", b"head");
            write_blob(&mut f, "OSMData", b"a");
            write_blob(&mut f, "OSMData", b"b");
        }
        let output = NamedTempFile::new().unwrap();
        std::fs::remove_file(output.path()).unwrap();

        let indexer = Indexer::new(
            Arc::new(AlwaysEmptyBlock),
            Arc::new(NoopDecompressor),
            Arc::new(OneLabelPerBlob),
            config(),
        );

        let report = indexer.build(input.path(), output.path()).unwrap();
        assert_eq!(report.blobs_seen, 3);
        assert_eq!(report.blobs_skipped, 0);
        assert_eq!(report.entries_indexed, 2);
    }
}
