//! Error types shared across the crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchflashError {
    /// The dataset could not be fetched or parsed. No session can start.
    #[error("dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// The chosen mode matched no images.
    #[error("no cards found for this selection")]
    EmptySelection,

    /// The favorites store could not be read or written.
    #[error("persistent storage unavailable: {0}")]
    PersistenceUnavailable(String),

    /// Navigation was invoked while no session stack is loaded.
    #[error("no active session")]
    NoActiveSession,

    #[error("image load failed: {0}")]
    ImageLoad(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArchflashError>;
