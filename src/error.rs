//! Error types for the relay gateway

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the relay gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Inbound webhook body did not carry a usable message
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Webhook signature missing or wrong
    #[error("signature error: {0}")]
    Signature(String),

    /// Channel (send) error
    #[error("channel error: {0}")]
    Channel(String),

    /// Media download error
    #[error("download error: {0}")]
    Download(String),

    /// File type the extractor does not handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Text extraction failed
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Completion API error
    #[error("completion error: {0}")]
    Completion(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
