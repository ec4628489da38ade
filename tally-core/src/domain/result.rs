//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// A required input column is absent; carries the column name.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Failed to read CSV: {0}")]
    Decode(String),

    #[error("Failed to read upload: {0}")]
    Upload(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a missing column error
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn(name.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an upload error
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error ends a request with the error payload
    /// rather than an internal failure.
    pub fn is_fatal_to_request(&self) -> bool {
        matches!(self, Self::MissingColumn(_) | Self::Decode(_) | Self::Upload(_))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
