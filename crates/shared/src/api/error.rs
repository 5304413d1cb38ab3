use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
#[cfg(feature = "backend")]
use {
    axum::{
        extract::rejection::{JsonRejection, PathRejection, QueryRejection},
        response::{IntoResponse, Response},
        Json,
    },
    tracing::error,
};

/// Abstract failure categories. Each maps onto exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    Gone,
    Internal,
}

impl ErrorKind {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Gone => StatusCode::GONE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine readable code
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ServerError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl ServerError {
    pub fn new<C: Into<String>, M: Into<String>>(kind: ErrorKind, code: C, message: M) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::Internal, "internal_error", message)
    }

    pub fn invalid_request<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorKind::InvalidInput, "invalid_request", message)
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code.clone(),
            message: self.message.clone(),
        }
    }
}

#[macro_export]
macro_rules! other_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::internal(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! bad_request_error {
    ($($arg:tt)*) => {
        $crate::api::error::ServerError::invalid_request(format!($($arg)*))
    };
}

#[cfg(feature = "backend")]
impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            error!(code = %self.code, "{}", self.message);
        }
        let status = self.kind.status_code();
        // Storage details stay in the log
        let body = if self.kind == ErrorKind::Internal {
            ErrorBody {
                error: self.code,
                message: "Internal server error".to_string(),
            }
        } else {
            self.body()
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(feature = "backend")]
impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

#[cfg(feature = "backend")]
impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

#[cfg(feature = "backend")]
impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::invalid_request(value.body_text())
    }
}

#[cfg(feature = "backend")]
impl From<rusqlite::Error> for ServerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::new(ErrorKind::Internal, "database_error", value.to_string())
    }
}

#[cfg(feature = "backend")]
impl From<deadpool_sqlite::InteractError> for ServerError {
    fn from(value: deadpool_sqlite::InteractError) -> Self {
        Self::new(ErrorKind::Internal, "database_error", format!("Interact error: {value}"))
    }
}

#[cfg(feature = "backend")]
impl From<deadpool_sqlite::PoolError> for ServerError {
    fn from(value: deadpool_sqlite::PoolError) -> Self {
        Self::new(ErrorKind::Internal, "database_error", format!("Pool error: {value}"))
    }
}
