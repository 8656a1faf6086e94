//! Session store abstraction.
//!
//! A store creates, loads and persists [`SessionRecord`]s. The session layer
//! only ever talks to a store through the [`SessionStore`] trait, so any
//! backend (memory, database, signed cookie) can sit behind it.

mod cookie;
mod memory;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue};

use crate::session::SessionRecord;
use crate::Result;

pub use cookie::{request_cookie, CookieOptions, SameSite};
pub use memory::MemoryStore;

/// Backend that loads and persists sessions.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load the session called `name` for a request, or create a new one.
    ///
    /// Stores return an error when the request carries session state they
    /// cannot decode. An unknown but well-formed session reference yields a
    /// fresh record.
    async fn load(&self, name: &str, headers: &HeaderMap) -> Result<SessionRecord>;

    /// Persist a session.
    ///
    /// Returns the `Set-Cookie` value to attach to the response, if any.
    async fn save(&self, name: &str, record: &SessionRecord) -> Result<Option<HeaderValue>>;

    /// Remove a session from the store.
    ///
    /// Returns the `Set-Cookie` value that expires the client's cookie, if any.
    async fn destroy(&self, name: &str, record: &SessionRecord) -> Result<Option<HeaderValue>>;
}
