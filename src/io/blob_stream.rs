//! Lazy, forward-only stream over OSM PBF blob framing (C6).
//!
//! Grounded directly in `astrolib::osmfile::blob_iterator<File>`: the
//! iterator holds a position pointing at the 4-byte length prefix of the
//! *current* blob, and defers both header and body parsing until first
//! accessed (`populate_header`/`populate_blob` in the original), memoizing
//! each. Advancing recomputes the next position from the just-parsed
//! header's `datasize` and resets the memoized state, mirroring the
//! original's `operator++` resetting `m_blob_pos` to zero and
//! `m_blob_populated` to false.

use std::sync::Arc;

use crate::error::Result;
use crate::io::blob::{Blob, BlobHeader};
use crate::io::mmap_file::MappedFile;
use crate::io::pbf_adapter::{decode_blob, decode_blob_header};

/// How many bytes of the blob payload to hint the kernel to read ahead once
/// the header has been parsed, per §4.6.
const BLOB_READAHEAD_BYTES: u64 = 1024 * 1024;

const LENGTH_PREFIX_BYTES: u64 = 4;

/// A lazy forward-only iterator over `(BlobHeader, Blob)` pairs in an OSM
/// PBF file.
pub struct BlobStream {
    file: Arc<MappedFile>,
    /// Offset of the 4-byte length prefix of the current blob.
    pos: u64,
    /// Offset of the current blob's payload, once the header is known.
    /// `None` means the header has not been read yet at `pos`.
    blob_pos: Option<u64>,
    /// Decoded header/blob, memoized until `advance` is called.
    decoded: Option<(BlobHeader, Blob)>,
}

impl BlobStream {
    pub fn new(file: Arc<MappedFile>) -> Self {
        BlobStream {
            file,
            pos: 0,
            blob_pos: None,
            decoded: None,
        }
    }

    /// `true` iff the stream has reached the end of the file.
    pub fn is_done(&self) -> bool {
        self.pos >= self.file.size()
    }

    fn populate_header(&mut self) -> Result<()> {
        if self.blob_pos.is_some() {
            return Ok(());
        }
        let prefix = self.file.read(self.pos, LENGTH_PREFIX_BYTES)?;
        let header_len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as u64;

        let header_bytes = self.file.read(self.pos + LENGTH_PREFIX_BYTES, header_len)?;
        let header = decode_blob_header(header_bytes, self.pos)?;

        let blob_pos = self.pos + LENGTH_PREFIX_BYTES + header_len;
        self.file.readahead(blob_pos, BLOB_READAHEAD_BYTES);
        self.blob_pos = Some(blob_pos);
        self.decoded = Some((header, placeholder_blob()));
        Ok(())
    }

    fn populate_blob(&mut self) -> Result<()> {
        self.populate_header()?;
        let blob_pos = self.blob_pos.expect("populate_header always sets blob_pos");

        let already_populated = self
            .decoded
            .as_ref()
            .map(|(_, blob)| !is_placeholder(blob))
            .unwrap_or(false);
        if already_populated {
            return Ok(());
        }

        let (header, _) = self.decoded.take().expect("populate_header always sets decoded");
        let body = self.file.read(blob_pos, header.datasize as u64)?;
        let blob = decode_blob(body, header.blob_type.clone(), self.pos)?;
        self.decoded = Some((header, blob));
        Ok(())
    }

    /// Returns the current `(header, blob)` pair, decoding and memoizing it
    /// on first access. Returns `None` at the end of the stream.
    pub fn current(&mut self) -> Option<Result<&(BlobHeader, Blob)>> {
        if self.is_done() {
            return None;
        }
        match self.populate_blob() {
            Ok(()) => Some(Ok(self.decoded.as_ref().expect("populated above"))),
            Err(e) => Some(Err(e)),
        }
    }

    /// Advances to the next blob. Ensures the header (but not necessarily
    /// the body) is decoded first, so `pos` can be recomputed even if the
    /// caller never dereferenced the current position.
    pub fn advance(&mut self) -> Result<()> {
        if self.is_done() {
            return Ok(());
        }
        self.populate_header()?;
        let header = self
            .decoded
            .as_ref()
            .map(|(header, _)| header.clone())
            .expect("populate_header always sets decoded");
        let blob_pos = self.blob_pos.expect("populate_header always sets blob_pos");

        self.pos = blob_pos + header.datasize as u64;
        self.blob_pos = None;
        self.decoded = None;
        Ok(())
    }
}

impl Iterator for BlobStream {
    type Item = Result<(BlobHeader, Blob)>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.current() {
            Some(Ok(pair)) => Ok(pair.clone()),
            Some(Err(e)) => Err(e),
            None => return None,
        };
        if let Err(e) = self.advance() {
            return Some(Err(e));
        }
        Some(item)
    }
}

fn placeholder_blob() -> Blob {
    use crate::io::blob::{BlobData, BlobHeader, BlobType};
    Blob {
        header: BlobHeader::new(BlobType::Unknown(String::new()), 0),
        data: BlobData::Raw(bytes::Bytes::new()),
        offset: u64::MAX,
    }
}

fn is_placeholder(blob: &Blob) -> bool {
    blob.offset == u64::MAX
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::blob::BlobType;
    use crate::io::mmap_file::MappedFile;
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

    #[test]
    fn streams_header_then_data_blob_in_order() {
        // S5
        let mut tmp = NamedTempFile::new().unwrap();
        write_blob(&mut tmp, "OSMHeader", b"head");
        write_blob(&mut tmp, "OSMData", b"data-payload");
        tmp.flush().unwrap();

        let file = Arc::new(MappedFile::open(tmp.path(), false, None).unwrap());
        let mut stream = BlobStream::new(file);

        let (first_header, first_blob) = stream.current().unwrap().unwrap();
        assert_eq!(first_header.blob_type, BlobType::OSMHeader);
        assert_eq!(first_blob.raw_size(), 4);
        stream.advance().unwrap();

        let (second_header, second_blob) = stream.current().unwrap().unwrap();
        assert_eq!(second_header.blob_type, BlobType::OSMData);
        assert_eq!(second_blob.raw_size(), 12);
        stream.advance().unwrap();

        assert!(stream.is_done());
        assert!(stream.current().is_none());
    }

    #[test]
    fn iterator_adapter_yields_both_blobs() {
        let mut tmp = NamedTempFile::new().unwrap();
        write_blob(&mut tmp, "OSMHeader", b"head");
        write_blob(&mut tmp, "OSMData", b"data-payload");
        tmp.flush().unwrap();

        let file = Arc::new(MappedFile::open(tmp.path(), false, None).unwrap());
        let stream = BlobStream::new(file);
        let pairs: Vec<_> = stream.map(|r| r.unwrap()).collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.blob_type, BlobType::OSMHeader);
        assert_eq!(pairs[1].0.blob_type, BlobType::OSMData);
    }
}
