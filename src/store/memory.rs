//! In-process session storage.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};

use super::{request_cookie, CookieOptions, SessionStore};
use crate::error::SessionError;
use crate::session::{SessionId, SessionRecord};
use crate::Result;

/// A persisted session plus bookkeeping.
#[derive(Debug, Clone)]
struct StoredSession {
    record: SessionRecord,
    last_activity: Instant,
}

/// Thread-safe in-memory session store.
///
/// The session cookie carries only the [`SessionId`]; values stay in this
/// process. Values are shared with the request that saved them, not copied.
#[derive(Debug)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, StoredSession>>,
    options: CookieOptions,
}

impl MemoryStore {
    /// Create a new empty store with default cookie options.
    pub fn new() -> Self {
        Self::with_options(CookieOptions::default())
    }

    /// Create a new empty store with the given cookie options.
    pub fn with_options(options: CookieOptions) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            options,
        }
    }

    /// Cookie options used for `Set-Cookie` headers.
    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Get a copy of a stored session.
    pub fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::LockPoisoned)?;
        Ok(sessions.get(id).map(|s| s.record.clone()))
    }

    /// Check if a session exists.
    pub fn contains(&self, id: &SessionId) -> Result<bool> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| SessionError::LockPoisoned)?;
        Ok(sessions.contains_key(id))
    }

    /// Remove a session from the store.
    ///
    /// Returns the removed record, or None if it didn't exist.
    pub fn remove(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;
        Ok(sessions.remove(id).map(|s| s.record))
    }

    /// Get the number of sessions in the store.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Remove sessions not loaded or saved for longer than `max_idle`.
    ///
    /// Returns the number of sessions removed.
    pub fn purge_idle(&self, max_idle: Duration) -> Result<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;

        let before = sessions.len();
        sessions.retain(|_, s| s.last_activity.elapsed() < max_idle);
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "purged idle sessions");
        }
        Ok(removed)
    }

    fn load_by_id(&self, id: SessionId) -> Result<SessionRecord> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;

        match sessions.get_mut(&id) {
            Some(stored) => {
                stored.last_activity = Instant::now();
                let mut record = stored.record.clone();
                record.is_new = false;
                Ok(record)
            }
            None => {
                tracing::debug!(session = %id, "unknown session id, starting a new session");
                Ok(SessionRecord::new())
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, name: &str, headers: &HeaderMap) -> Result<SessionRecord> {
        match request_cookie(headers, name) {
            Some(value) => self.load_by_id(value.parse()?),
            None => Ok(SessionRecord::new()),
        }
    }

    async fn save(&self, name: &str, record: &SessionRecord) -> Result<Option<HeaderValue>> {
        let header = self.options.header_value(name, &record.id.to_string())?;

        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| SessionError::LockPoisoned)?;

        let mut record = record.clone();
        record.is_new = false;
        sessions.insert(
            record.id,
            StoredSession {
                record,
                last_activity: Instant::now(),
            },
        );
        Ok(Some(header))
    }

    async fn destroy(&self, name: &str, record: &SessionRecord) -> Result<Option<HeaderValue>> {
        self.remove(&record.id)?;
        Ok(Some(self.options.expired_header_value(name)?))
    }
}
