//! Error types for the harness.
//!
//! # Design
//! Failures are split by blast radius. `ConfigError` means the harness cannot
//! run with that configuration at all. `FixtureError` and `TransportError`
//! only sink the test that triggered them. Non-2xx responses are never errors:
//! status codes come back as data inside `ApiResponse`.

use std::path::PathBuf;

use thiserror::Error;

/// The configuration source exists but could not be read or understood.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration in {path} at line {line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A numeric key holds something that does not parse as a number.
    #[error("configuration key `{key}` is not a valid integer: {value:?}")]
    InvalidNumber { key: String, value: String },
}

/// Failures resolving catalog keys or loading JSON payloads.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture catalog not found at {0}")]
    CatalogMissing(PathBuf),

    #[error("failed to read fixture catalog: {0}")]
    Catalog(#[source] ConfigError),

    #[error("catalog key not found: {0}")]
    KeyNotFound(String),

    #[error("catalog key `{key}` is not a valid status code: {value:?}")]
    InvalidStatusCode { key: String, value: String },

    #[error("fixture resource not found: {0}")]
    ResourceNotFound(PathBuf),

    #[error("failed to read fixture resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture resource {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `len` is `None` when the payload is not an array.
    #[error("invalid fixture index {index} (length {len:?})")]
    Index { index: i64, len: Option<usize> },
}

/// Anything that went wrong between dispatching a request and holding the
/// full response body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {url} timed out: {detail}")]
    Timeout {
        method: &'static str,
        url: String,
        detail: String,
    },

    #[error("{method} {url} failed: {source}")]
    Io {
        method: &'static str,
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{method} {url} failed: {message}")]
    Request {
        method: &'static str,
        url: String,
        message: String,
    },

    #[error("client is closed")]
    Closed,
}
