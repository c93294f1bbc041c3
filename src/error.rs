use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::FormField;

/// Any failure talking to the backend. Callers treat every variant the same
/// way; the split only exists for logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("{0} is required")]
    Validation(FormField),
    #[error("no record with id {0}")]
    UnknownRecord(String),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("editor state lock poisoned")]
    StateLock,
    #[error("editor has been unmounted")]
    Unmounted,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no file selected")]
    NoFileSelected,
    #[error(transparent)]
    Api(#[from] ApiError),
}
