//! Error types surfaced by fallible entry points.
//!
//! Hot-path operations (`Cache::get`, `Cache::update`) are infallible by
//! contract: admission rejection and cold-page misses are reported through
//! their `bool`/`()` return values, not through this enum. This type covers
//! the genuinely fatal cases: disk I/O failure during startup or
//! persistence, and configuration that fails validation before a cache is
//! ever built.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a `Cache` operation outright.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A directory/header/page file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
        /// Path the failing operation was acting on.
        path: PathBuf,
    },

    /// A `CacheConfig` failed `validate()`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    pub(crate) fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        CacheError::Io {
            source,
            path: path.into(),
        }
    }
}

/// Convenience alias for this crate's fallible results.
pub type Result<T> = std::result::Result<T, CacheError>;
