//! `mapindexer <input.osm.pbf> <output.idx>` (§6): builds a persistent
//! quadtree index from an OSM PBF planet extract. Exits 0 on success,
//! non-zero with a diagnostic on stderr otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use mapindexer::console;
use mapindexer::index::IndexEntry;
use mapindexer::indexer::{EntryExtractor, Indexer, IndexerConfig};
use mapindexer::io::pbf_adapter::{NoopDecompressor, NoopPrimitiveBlockDecoder};

/// The default build doesn't know how to turn OSM primitives into
/// renderable geometry (that mapping is a rendering-layer policy, §1's
/// explicit non-goal), so it contributes no entries. A real deployment
/// supplies its own [`EntryExtractor`] (and a real `PrimitiveBlockDecoder`
/// / `Decompressor`) via [`Indexer::new`] directly.
struct NoEntries;

impl EntryExtractor for NoEntries {
    fn extract(&self, _block: &mapindexer::blocks::primitives::PrimitiveBlock, _blob_pos: u64) -> Vec<IndexEntry> {
        Vec::new()
    }
}

fn run(input: PathBuf, output: PathBuf) -> mapindexer::Result<()> {
    let indexer = Indexer::new(
        Arc::new(NoopPrimitiveBlockDecoder),
        Arc::new(NoopDecompressor),
        Arc::new(NoEntries),
        IndexerConfig::default(),
    );

    let report = indexer.build(&input, &output)?;
    console::out(&format!(
        "indexed {} blob(s) ({} skipped), {} entries",
        report.blobs_seen, report.blobs_skipped, report.entries_indexed
    ));
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let [_, input, output] = args.as_slice() else {
        console::err("usage: mapindexer <input.osm.pbf> <output.idx>");
        return ExitCode::FAILURE;
    };

    match run(PathBuf::from(input.as_str()), PathBuf::from(output.as_str())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console::err(&format!("mapindexer: {e}"));
            ExitCode::FAILURE
        }
    }
}
