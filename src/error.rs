use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a failed robot API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unreachable,
    BadStatus,
    BadResponseShape,
    Unsupported,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("robot API unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("robot API returned status {0}")]
    BadStatus(StatusCode),

    #[error("unexpected response body: {0}")]
    BadResponseShape(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unreachable(_) => ErrorKind::Unreachable,
            ApiError::BadStatus(_) => ErrorKind::BadStatus,
            ApiError::BadResponseShape(_) => ErrorKind::BadResponseShape,
            ApiError::Unsupported(_) => ErrorKind::Unsupported,
        }
    }

    pub(crate) fn shape(detail: impl Into<String>) -> Self {
        ApiError::BadResponseShape(detail.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
