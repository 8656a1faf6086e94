//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::SessionError;

/// Unique identifier for a visitor session.
///
/// Session IDs are random 128-bit values, so they are safe to hand out in
/// cookies. The ID is displayed as `sess-XXXX...` with 32 lowercase
/// hexadecimal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw u128 value.
    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    /// Create a SessionId from a raw u128 value.
    ///
    /// This is primarily for testing.
    pub fn from_raw(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sess-{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("sess-")
            .filter(|hex| hex.len() == 32 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u128::from_str_radix(hex, 16).ok())
            .map(Self::from_raw)
            .ok_or_else(|| SessionError::Store(format!("malformed session id: {s:?}")))
    }
}
