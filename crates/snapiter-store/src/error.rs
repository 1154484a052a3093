use thiserror::Error;

/// Result type local to snapiter-store.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("checkpoint storage error: {0}")]
    Storage(String),

    #[error("unsupported codec: {0}")]
    CodecUnsupported(&'static str),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("checkpoint {path} changed since it was saved")]
    Stale { path: String },

    #[error("bad snapshot header: {0}")]
    BadHeader(String),

    #[error("snapshot of {len} bytes exceeds limit {max}")]
    TooLarge { len: u64, max: u64 },

    #[error("state encoding error: {0}")]
    Serde(String),

    #[error(transparent)]
    Core(#[from] snapiter_core::Error),
}
