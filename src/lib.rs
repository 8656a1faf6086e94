//! # request-sessions
//!
//! Per-request session handles and typed accessors for axum.
//!
//! A [`SessionLayer`] binds an unmaterialized [`SessionHandle`] to every
//! request. Handlers extract a [`Session`], which loads the record from the
//! [`SessionStore`] on first use, and read or write values through typed
//! accessors. Saving hands the record back to the store, and the layer writes
//! the resulting cookie into the response.
//!
//! ## Features
//!
//! - **Lazy sessions**: the store is only consulted when a handler asks
//! - **Typed values**: `get::<T>` fails loudly on a type mismatch
//! - **Flashes**: read-once messages grouped by category
//! - **Pluggable stores**: anything implementing [`SessionStore`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{routing::get, Router};
//! use request_sessions::{MemoryStore, Session, SessionLayer};
//!
//! async fn visits(session: Session) -> Result<String, request_sessions::SessionError> {
//!     let count = session.get::<u64>("visits")?.unwrap_or(0) + 1;
//!     session.set("visits", count);
//!     session.save().await?;
//!     Ok(format!("visit #{}", count))
//! }
//!
//! #[tokio::main]
//! async fn main() -> request_sessions::Result<()> {
//!     request_sessions::logging::try_init().ok();
//!
//!     let store = Arc::new(MemoryStore::new());
//!     let app = Router::new()
//!         .route("/", get(visits))
//!         .layer(SessionLayer::new("sid", store));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use middleware::{SessionLayer, SessionService};
pub use session::{
    start, Session, SessionHandle, SessionId, SessionRecord, SessionValue,
    DEFAULT_FLASH_CATEGORY,
};
pub use store::{CookieOptions, MemoryStore, SameSite, SessionStore};
