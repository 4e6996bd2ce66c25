//! Error types for the relay gateway

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the relay gateway
///
/// Per-message-cycle failures (`HistoryFetch`, `Completion`, `Dispatch`) are
/// contained to their cycle and logged; only `Config` is fatal at startup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad value)
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport handshake rejected
    #[error("authentication error: {0}")]
    Auth(String),

    /// Session blob could not be read or written
    #[error("session persistence error: {0}")]
    Persistence(String),

    /// Transport failure while fetching a conversation window
    #[error("history fetch error: {0}")]
    HistoryFetch(String),

    /// Completion service failure or malformed response
    #[error("completion error: {0}")]
    Completion(String),

    /// Reply could not be delivered
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// Other transport operation failure
    #[error("transport error: {0}")]
    Transport(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
