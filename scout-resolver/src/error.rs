//! Error types for scout-resolver
//!
//! Only [`ResolveError`] ever reaches a caller. Fetch and dataset errors are
//! absorbed by the tier that produced them and logged.

use thiserror::Error;

/// Failure of a single live fetch strategy
///
/// Always swallowed by the strategy chain, which moves on to the next strategy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Attempt exceeded its timeout
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Body or envelope could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// On-disk dataset load failure
///
/// Degraded by the store to "built-in entries only".
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Parsed, but not a JSON array of records
    #[error("Unexpected dataset shape in {0}: expected a JSON array")]
    Shape(String),

    /// No candidate path configured
    #[error("No dataset candidate paths configured")]
    NoCandidates,
}

/// Resolution failure surfaced to callers
///
/// "No tier produced a profile" is not an error; see `Resolution::NotFound`.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Upstream roster directory failed
    #[error("Player directory error: {0}")]
    Directory(String),

    /// Unexpected internal failure (e.g. HTTP client construction)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for resolution calls
pub type ResolveResult<T> = Result<T, ResolveError>;
