//! # Error Types
//!
//! Custom error types for Pad Transcoder using `thiserror`.

use thiserror::Error;

use crate::controller::MappingError;

/// Main error type for Pad Transcoder
#[derive(Debug, Error)]
pub enum RemapError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// A button or axis entry violates its mapping contract
    #[error("Invalid mapping '{name}': {source}")]
    Mapping {
        /// Name of the offending `[[buttons]]` or `[[axes]]` entry
        name: String,
        /// What is wrong with it
        #[source]
        source: MappingError,
    },

    /// Malformed capture file
    #[error("Capture error: {0}")]
    Capture(String),

    /// Frame log serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemapError {
    /// Attaches an entry name to a mapping error.
    pub fn mapping(name: impl Into<String>, source: MappingError) -> Self {
        Self::Mapping {
            name: name.into(),
            source,
        }
    }
}

/// Result type alias for Pad Transcoder
pub type Result<T> = std::result::Result<T, RemapError>;
