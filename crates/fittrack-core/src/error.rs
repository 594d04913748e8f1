//! Error types for `FitTrack` core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `FitTrack` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while resolving configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
