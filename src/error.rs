//! Error types for shinebridge
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for shinebridge operations
///
/// This enum encompasses all possible errors that can occur during
/// credential encoding, vendor authentication, device directory listing,
/// snapshot fetching, and session persistence.
#[derive(Error, Debug)]
pub enum ShinebridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential encoding failures (bad key material, oversized secret)
    #[error("Credential encoding error: {0}")]
    Encoding(String),

    /// Vendor login failures (rejected credentials, unparsable login response)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Device directory listing failures
    #[error("Device directory error: {0}")]
    Directory(String),

    /// Snapshot payload carried a device category this bridge does not support
    #[error("Unsupported device category: {0}")]
    UnsupportedDevice(String),

    /// Snapshot payload was missing or structurally invalid
    #[error("Malformed vendor response: {0}")]
    MalformedResponse(String),

    /// A snapshot fetch was attempted without a valid session
    ///
    /// This indicates an ordering bug in the caller: the poll cycle must
    /// establish a session before fetching snapshots.
    #[error("Not authenticated: a valid session is required before fetching snapshots")]
    NotAuthenticated,

    /// Session file persistence failures
    #[error("Session store error: {0}")]
    Store(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for shinebridge operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
