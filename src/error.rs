//! Unified error type for phrasebook.

use thiserror::Error;

/// Errors raised by image backends, the phrase store and the service around them.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An upstream API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No API key configured for a backend that needs one.
    #[error("No API key for {backend}. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The backend name.
        backend: String,
        /// The environment variable name.
        env_var: String,
    },

    /// Every backend in the chain reported that it had no image.
    #[error("No image backend produced a result ({tried} tried)")]
    NoImageAvailable {
        /// Number of backends that were consulted.
        tried: usize,
    },

    /// The requested phrase does not exist.
    #[error("Phrase not found: {0}")]
    NotFound(String),

    /// The phrase store failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}
