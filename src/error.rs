//! Error types for request-sessions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;

/// Main error type for session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session handle was bound to the request.
    #[error("session not bound to request; is the session layer installed?")]
    NotBound,

    /// The store could not load or persist the session.
    #[error("session store error: {0}")]
    Store(String),

    /// The stored value has a different type than the one requested.
    #[error("type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// No value stored under the key.
    #[error("no value for key: {0}")]
    KeyNotFound(String),

    /// The response carrying the session cookie was already finalized.
    ///
    /// A save or destroy that was already in flight still reached the store.
    #[error("response already committed")]
    ResponseCommitted,

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// Stable machine-readable code used in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotBound => "SESSION_NOT_BOUND",
            Self::Store(_) => "SESSION_STORE_ERROR",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::KeyNotFound(_) => "KEY_NOT_FOUND",
            Self::ResponseCommitted => "RESPONSE_COMMITTED",
            Self::LockPoisoned | Self::Io(_) => "INTERNAL_ERROR",
        }
    }

    /// Extra context for error responses.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::TypeMismatch {
                expected, found, ..
            } => Some(format!("expected {}, found {}", expected, found)),
            _ => None,
        }
    }

    /// HTTP status reported when the error aborts a handler.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::KeyNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "session error aborted request");
        }
        let mut body = ErrorResponse::new(self.code(), self.to_string());
        if let Some(details) = self.details() {
            body = body.with_details(details);
        }
        (status, Json(body)).into_response()
    }
}

/// Convenience Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
