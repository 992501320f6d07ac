//! Error types for the simulator.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed island layout: bad landscape code, unequal row lengths, or
    /// a border cell that is not water.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Invalid organism initialization or out-of-range parameter update.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown species or landscape name in a configuration call.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
