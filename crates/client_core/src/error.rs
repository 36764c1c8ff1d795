use std::time::Duration;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("request to {endpoint} timed out after {}ms", .after.as_millis())]
    Timeout { endpoint: String, after: Duration },
    #[error("{}, {status}", .error.message)]
    Http { status: u16, error: ApiError },
    #[error("{message}")]
    Application { message: String },
    #[error("unexpected response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("CSRF token missing; refusing to send {endpoint}")]
    MissingCsrfToken { endpoint: String },
    #[error("page element '{id}' missing")]
    MissingElement { id: String },
    #[error("request superseded by a newer click")]
    Superseded,
}

impl ClientError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            error: ApiError::from_status(status, message),
        }
    }

    pub fn missing_element(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http { error, .. } => error.code,
            Self::Application { .. } => ErrorCode::Validation,
            Self::MissingCsrfToken { .. } => ErrorCode::Forbidden,
            _ => ErrorCode::Unknown,
        }
    }
}
