use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere in the mapped-file, blob-framing or quadtree layers.
///
/// `Interrupted` (the lock-free queue's cancellation signal) is deliberately
/// not a variant here: it is an internal control signal, not a user-visible
/// error, and is modeled by [`crate::concurrent::queue::PopOutcome`] instead.
#[derive(Error, Debug)]
pub enum MapIndexError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("range error: read({pos}, {size}) exceeds limit {limit}")]
    Range { pos: u64, size: u64, limit: u64 },

    #[error("failed to parse {type_name} at offset {offset}: {initialization_error}")]
    PbfParse {
        type_name: String,
        initialization_error: String,
        offset: u64,
    },

    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, MapIndexError>;

impl MapIndexError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapIndexError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn range(pos: u64, size: u64, limit: u64) -> Self {
        MapIndexError::Range { pos, size, limit }
    }

    pub fn pbf_parse(
        type_name: impl Into<String>,
        initialization_error: impl Into<String>,
        offset: u64,
    ) -> Self {
        MapIndexError::PbfParse {
            type_name: type_name.into(),
            initialization_error: initialization_error.into(),
            offset,
        }
    }
}
