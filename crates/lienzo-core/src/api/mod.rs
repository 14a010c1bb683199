pub mod completion;
pub mod upload;

pub use completion::CompletionClient;
pub use upload::UploadClient;

use thiserror::Error;

/// What went wrong with a remote request.
///
/// The controllers never propagate these to their callers; they absorb them
/// into terminal display state. Keeping the kind around makes the failure
/// path observable to tests and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS,
    /// timeout, or the background task running it died).
    #[error("network error: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("service responded with status {status}")]
    Status { status: u16, body: String },
    /// Success status, but the body was not in the expected shape.
    #[error("unexpected response body: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
