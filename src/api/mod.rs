//! Demo HTTP API built on the session layer.
//!
//! Every route under `/api/v1/session` runs behind [`SessionLayer`], so the
//! handlers can take a [`Session`](crate::Session) argument.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1` - API information
//!
//! ### Session
//! - `GET /api/v1/session` - Session ID and stored keys
//! - `DELETE /api/v1/session` - Destroy the session
//! - `DELETE /api/v1/session/values` - Remove all values
//! - `GET /api/v1/session/values/{key}` - Read a value
//! - `PUT /api/v1/session/values/{key}` - Store a value
//! - `DELETE /api/v1/session/values/{key}` - Remove a value
//! - `GET /api/v1/session/visits` - Increment and return a visit counter
//! - `GET /api/v1/session/flashes?category=` - Take flash messages
//! - `POST /api/v1/session/flashes?category=` - Queue a flash message
//!
//! ## Example
//!
//! ```no_run
//! use request_sessions::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> request_sessions::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config).await
//! }
//! ```
//!
//! [`SessionLayer`]: crate::SessionLayer

pub mod handlers;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{
    create_router, create_router_with_state, serve, serve_with_state, ServerConfig,
    SessionSettings,
};
pub use types::{
    AddFlashRequest, ErrorResponse, FlashQuery, FlashesResponse, SessionInfoResponse,
    SetValueRequest, ValueResponse, VisitsResponse,
};
