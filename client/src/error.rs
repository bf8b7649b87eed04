use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

pub const LOAD_FAILED: &str = "Failed to load guestbook entries";
pub const SUBMIT_FAILED: &str = "Failed to submit entry";
pub const DELETE_FAILED: &str = "Failed to delete entry";

/// What the user gets to see when an operation fails. `Display` is the fixed
/// public message; `detail` is the underlying cause, kept for the logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("{}", LOAD_FAILED)]
    LoadFailed { detail: String },

    #[error("{}", SUBMIT_FAILED)]
    SubmitFailed { detail: String },

    #[error("{}", DELETE_FAILED)]
    DeleteFailed { detail: String },
}

impl ClientError {
    pub fn message(&self) -> &'static str {
        match self {
            ClientError::LoadFailed { .. } => LOAD_FAILED,
            ClientError::SubmitFailed { .. } => SUBMIT_FAILED,
            ClientError::DeleteFailed { .. } => DELETE_FAILED,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ClientError::LoadFailed { detail }
            | ClientError::SubmitFailed { detail }
            | ClientError::DeleteFailed { detail } => detail,
        }
    }
}
