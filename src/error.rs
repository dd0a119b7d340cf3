//! Error types for ArborKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ArborError
pub type Result<T> = std::result::Result<T, ArborError>;

/// Unified error type for ArborKV operations
#[derive(Debug, Error)]
pub enum ArborError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record codec error: {0}")]
    Codec(#[from] csv::Error),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    #[error("parse error: {0}")]
    Parse(String),

    #[error("top-level key miss {0}")]
    KeyMiss(String),

    #[error("index request out of range: {requested} vs {len}")]
    IndexOutOfRange { requested: i64, len: usize },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("stored value is not a structured node: {0}")]
    Decode(String),

    #[error("node encoding failed: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An error reported by the server, relayed verbatim by the client.
    #[error("{0}")]
    Remote(String),

    // -------------------------------------------------------------------------
    // Durability Log Errors
    // -------------------------------------------------------------------------
    #[error("log writer closed")]
    LogClosed,
}

impl ArborError {
    /// Build a parse error from anything printable.
    pub fn parse(msg: impl Into<String>) -> Self {
        ArborError::Parse(msg.into())
    }
}
