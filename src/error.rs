use std::io;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The writer accepted fewer bytes than one item record.
    #[error("short write: expected {expected} bytes, wrote {written} bytes")]
    ShortWrite { expected: usize, written: usize },

    #[error("write failed after {written} bytes: {source}")]
    Write {
        written: usize,
        #[source]
        source: io::Error,
    },

    /// Item stream ended in the middle of a record.
    #[error("item stream of {len} bytes is not a multiple of the record size")]
    TruncatedRecord { len: usize },

    #[error("bitmap decode failed: {0}")]
    Bitmap(#[source] io::Error),
}
