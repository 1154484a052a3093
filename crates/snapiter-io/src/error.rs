use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] snapiter_store::Error),

    #[error(transparent)]
    Core(#[from] snapiter_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
