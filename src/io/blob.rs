use bytes::Bytes;
use std::str::FromStr;

use crate::error::{MapIndexError, Result};

/// Maximum size for a BlobHeader: 64 KiB (65,536 bytes)
pub const MAX_BLOB_HEADER_SIZE: usize = 65_536;

/// Maximum size for a Blob (uncompressed): 32 MiB (33,554,432 bytes)
pub const MAX_BLOB_MESSAGE_SIZE: usize = 33_554_432;

/// Represents the type of data contained in a Blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobType {
    /// OSM file metadata (HeaderBlock)
    OSMHeader,
    /// Actual OSM map elements (PrimitiveBlock)
    OSMData,
    /// Non-standard blob with custom identifier
    Unknown(String),
}

impl FromStr for BlobType {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<BlobType, ()> {
        Ok(match s {
            "OSMHeader" => BlobType::OSMHeader,
            "OSMData" => BlobType::OSMData,
            other => BlobType::Unknown(other.to_string()),
        })
    }
}

impl BlobType {
    /// Returns the string identifier for this BlobType
    pub fn as_str(&self) -> &str {
        match self {
            BlobType::OSMHeader => "OSMHeader",
            BlobType::OSMData => "OSMData",
            BlobType::Unknown(s) => s,
        }
    }
}

/// Header for a Blob, containing metadata about the blob's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHeader {
    /// Type of data in the blob
    pub blob_type: BlobType,
    /// Size of the blob data in bytes
    pub datasize: u32,
    /// Optional index data (for future use)
    pub indexdata: Option<Bytes>,
}

impl BlobHeader {
    /// Creates a new BlobHeader
    pub fn new(blob_type: BlobType, datasize: u32) -> Self {
        Self {
            blob_type,
            datasize,
            indexdata: None,
        }
    }

    /// Validates that the header size doesn't exceed limits
    pub fn validate_size(&self, header_size: usize) -> Result<()> {
        if header_size > MAX_BLOB_HEADER_SIZE {
            return Err(MapIndexError::Decode(format!(
                "blob header too large: {header_size} bytes (max: {MAX_BLOB_HEADER_SIZE} bytes)"
            )));
        }
        Ok(())
    }
}

/// A Blob represents a binary data block in the OSM PBF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Header containing metadata about this blob
    pub header: BlobHeader,
    /// The actual data, either raw or compressed
    pub data: BlobData,
    /// Byte offset in the file for precise navigation
    pub offset: u64,
}

/// Represents the data contained in a Blob, which can be compressed or raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobData {
    /// Raw, uncompressed data
    Raw(Bytes),
    /// Zlib-compressed data with original size
    ZlibData { compressed: Bytes, raw_size: u32 },
    /// LZMA-compressed data with original size
    LzmaData { compressed: Bytes, raw_size: u32 },
    /// Bzip2-compressed data with original size (OSM PBF's deprecated field)
    Bzip2Data { compressed: Bytes, raw_size: u32 },
}

impl BlobData {
    /// Returns the uncompressed size of the data
    pub fn raw_size(&self) -> u32 {
        match self {
            BlobData::Raw(data) => data.len() as u32,
            BlobData::ZlibData { raw_size, .. } => *raw_size,
            BlobData::LzmaData { raw_size, .. } => *raw_size,
            BlobData::Bzip2Data { raw_size, .. } => *raw_size,
        }
    }

    /// Returns true if the data is compressed
    pub fn is_compressed(&self) -> bool {
        !matches!(self, BlobData::Raw(_))
    }

    /// Validates that the uncompressed size doesn't exceed limits
    pub fn validate_size(&self) -> Result<()> {
        let size = self.raw_size() as usize;
        if size > MAX_BLOB_MESSAGE_SIZE {
            return Err(MapIndexError::Decode(format!(
                "blob message too large: {size} bytes (max: {MAX_BLOB_MESSAGE_SIZE} bytes)"
            )));
        }
        Ok(())
    }
}

impl Blob {
    /// Creates a new Blob with raw data
    pub fn new_raw(blob_type: BlobType, data: Bytes, offset: u64) -> Result<Self> {
        let header = BlobHeader::new(blob_type, data.len() as u32);
        let blob_data = BlobData::Raw(data);

        blob_data.validate_size()?;

        Ok(Self {
            header,
            data: blob_data,
            offset,
        })
    }

    /// Creates a new Blob with zlib-compressed data
    pub fn new_zlib(blob_type: BlobType, compressed: Bytes, raw_size: u32, offset: u64) -> Result<Self> {
        let header = BlobHeader::new(blob_type, compressed.len() as u32);
        let blob_data = BlobData::ZlibData { compressed, raw_size };

        blob_data.validate_size()?;

        Ok(Self {
            header,
            data: blob_data,
            offset,
        })
    }

    /// Returns the type of data contained in this blob
    pub fn blob_type(&self) -> &BlobType {
        &self.header.blob_type
    }

    /// Returns the byte offset of this blob in the file
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the size of the compressed/raw data
    pub fn compressed_size(&self) -> u32 {
        self.header.datasize
    }

    /// Returns the size of the uncompressed data
    pub fn raw_size(&self) -> u32 {
        self.data.raw_size()
    }

    /// Returns true if this blob contains compressed data
    pub fn is_compressed(&self) -> bool {
        self.data.is_compressed()
    }
}
