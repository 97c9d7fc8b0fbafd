use std::path::PathBuf;

use thiserror::Error;

/// Failures of a single backend call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status; `body` is the backend's JSON error body (or its raw
    /// text when the body is not JSON).
    #[error("backend returned {status}: {body}")]
    Backend {
        status: u16,
        body: serde_json::Value,
    },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;
