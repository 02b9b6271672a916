//! Error types for the packet-id-gen crate.

use std::path::PathBuf;

/// Errors that can occur while generating packet ID constants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The schema endpoint could not be reached or answered with a failure status.
    #[error("fetch failed: {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The schema document is not valid JSON.
    #[error("failed to decode schema JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The document does not have the shape expected at `path`.
    #[error("schema error at {path}: {reason}")]
    Schema { path: String, reason: String },

    /// Two packets within one direction would be emitted under the same name,
    /// either because their raw names normalize alike or because a
    /// direction suffix turned one name into another that already exists.
    #[error("schema error at {path}: packets {first} and {second} would both be emitted as '{name}'")]
    DuplicateName {
        path: String,
        name: String,
        first: String,
        second: String,
    },

    /// The same identifier would be emitted by two directional mappings.
    #[error("identifier '{name}' is emitted by both {first} and {second}")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// The async runtime driving the download could not be started.
    #[cfg(feature = "download")]
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Failed to read a local schema file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the generated file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
