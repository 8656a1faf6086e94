//! Axum extractors for sessions.
//!
//! Extracting [`Session`] is the must-acquire path: if the session cannot be
//! materialized the handler never runs and the [`SessionError`] is turned
//! into an error response.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::{Session, SessionHandle};
use crate::error::SessionError;

impl<S> FromRequestParts<S> for SessionHandle
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SessionHandle::from_extensions(&parts.extensions)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        SessionHandle::from_extensions(&parts.extensions)?
            .start()
            .await
    }
}
