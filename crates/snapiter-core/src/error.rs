use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised by producers and operators.
///
/// Exhaustion is never an error: it is `Ok(None)` from `Producer::next`.
#[derive(Debug, Error)]
pub enum Error {
    /// Operator parameters out of domain; raised by constructors, never deferred.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A captured state could not be turned back into a producer.
    #[error("restore failed: {0}")]
    Restore(String),

    /// An equal-length zip found an input that ended before the others.
    #[error("input {index} ended before the other inputs")]
    LengthMismatch { index: usize },

    /// Read faults from file-backed inputs, passed through unchanged.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Faults raised by caller-supplied producers.
    #[error("upstream fault: {0}")]
    Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a fault raised by a caller-supplied producer.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Upstream(Box::new(err))
    }
}
