use std::path::PathBuf;

use thiserror::Error;

/// Error type for CGI queries.
#[derive(Error, Debug)]
pub enum CgiError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CGI returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Invalid authorization header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Can't parse CGI response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Can't read result archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed variant row at line {line}: expected at least {expected} columns, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Variant file has no header line: {0}")]
    EmptyInput(PathBuf),

    #[error("CGI job log response has no `logs` array")]
    MalformedLogs,

    #[error("Result archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("CGI credentials missing: {0}")]
    MissingCredentials(String),
}

/// Result type alias for CGI operations.
pub type Result<T> = std::result::Result<T, CgiError>;
