use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Failure of a single sink operation (open, write or close).
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("sink `{0}` is not open")]
    NotOpen(&'static str),
    #[error("{failed} of {total} tcp clients failed")]
    Broadcast { failed: usize, total: usize },
    #[error("table `{0}` has none of the recognised log columns")]
    NoLogColumns(String),
    #[error("write panicked: {0}")]
    Panicked(String),
}

/// A configured sink that could not be started.
#[derive(Debug, Error)]
#[error("sink `{sink}`: {error}")]
pub struct SinkSetupError {
    pub sink: String,
    #[source]
    pub error: SinkError,
}
