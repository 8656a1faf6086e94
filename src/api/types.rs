//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Response describing the caller's session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfoResponse {
    /// Session ID.
    pub session_id: String,
    /// Whether the session was created by this request.
    pub is_new: bool,
    /// Stored keys, sorted.
    pub keys: Vec<String>,
}

impl SessionInfoResponse {
    pub fn from_session(session: &Session) -> Self {
        let mut keys = session.keys();
        keys.sort();
        Self {
            session_id: session.id().to_string(),
            is_new: session.is_new(),
            keys,
        }
    }
}

/// Request to store a value.
#[derive(Debug, Clone, Deserialize)]
pub struct SetValueRequest {
    /// Any JSON value.
    pub value: serde_json::Value,
}

/// A stored value.
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    pub key: String,
    pub value: serde_json::Value,
}

/// Visit counter.
#[derive(Debug, Clone, Serialize)]
pub struct VisitsResponse {
    pub visits: u64,
}

/// Flash category selector.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlashQuery {
    /// Category name; the default category when absent.
    #[serde(default)]
    pub category: Option<String>,
}

/// Request to queue a flash message.
#[derive(Debug, Clone, Deserialize)]
pub struct AddFlashRequest {
    pub message: serde_json::Value,
}

/// Flash messages taken from the session.
#[derive(Debug, Clone, Serialize)]
pub struct FlashesResponse {
    pub category: String,
    pub messages: Vec<serde_json::Value>,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "KEY_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
