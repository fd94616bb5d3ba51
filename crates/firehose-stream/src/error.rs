//! Error types for the streaming engine

use thiserror::Error;

/// Result type alias for streaming operations
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while connecting to or reading the feed
///
/// Everything except [`StreamError::RetriesExhausted`] is retryable: the
/// supervisor catches it, logs it, and reconnects after a backoff sleep.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Transport-level failure: DNS, TCP, TLS, or a mid-stream read error
    #[error("Connection error: {0}")]
    Connect(#[from] reqwest::Error),

    /// Invalid endpoint URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server answered with a non-200 status
    #[error("HTTP error {status} ({reason})")]
    HttpStatus { status: u16, reason: String },

    /// Malformed compressed data; decoder state is unrecoverable mid-stream,
    /// so this forces a full reconnect
    #[error("Decompression error: {0}")]
    Decompress(String),

    /// The stream stopped making forward progress
    #[error("Reached maximum read attempts ({0} consecutive empty reads)")]
    Stalled(u32),

    /// The reconnect budget is spent
    #[error("Gave up after {attempts} connection attempts")]
    RetriesExhausted { attempts: u32 },

    /// IO error on the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
