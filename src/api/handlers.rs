//! REST API handlers.
//!
//! Every handler that changes the session saves it explicitly; the session
//! layer then attaches the cookie to the response.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::types::{
    AddFlashRequest, FlashQuery, FlashesResponse, SessionInfoResponse, SetValueRequest,
    ValueResponse, VisitsResponse,
};
use crate::error::SessionError;
use crate::session::{Session, DEFAULT_FLASH_CATEGORY};
use crate::store::MemoryStore;

const VISITS_KEY: &str = "visits";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "request-sessions",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "sessions": state.store.count(),
    }))
}

/// Describe the caller's session.
pub async fn session_info(session: Session) -> Json<SessionInfoResponse> {
    Json(SessionInfoResponse::from_session(&session))
}

/// Destroy the caller's session.
pub async fn destroy_session(session: Session) -> Result<StatusCode, SessionError> {
    session.destroy().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove every stored value.
pub async fn clear_values(session: Session) -> Result<StatusCode, SessionError> {
    session.clear();
    session.save().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read a value.
pub async fn get_value(
    session: Session,
    Path(key): Path<String>,
) -> Result<Json<ValueResponse>, SessionError> {
    let value: serde_json::Value = session.must_get(&key)?;
    Ok(Json(ValueResponse { key, value }))
}

/// Store a value.
pub async fn put_value(
    session: Session,
    Path(key): Path<String>,
    Json(req): Json<SetValueRequest>,
) -> Result<Json<ValueResponse>, SessionError> {
    session.set(key.clone(), req.value.clone());
    session.save().await?;
    Ok(Json(ValueResponse {
        key,
        value: req.value,
    }))
}

/// Remove a value.
pub async fn delete_value(
    session: Session,
    Path(key): Path<String>,
) -> Result<StatusCode, SessionError> {
    session.delete(&key);
    session.save().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Count visits in this session.
pub async fn visits(session: Session) -> Result<Json<VisitsResponse>, SessionError> {
    let visits = session.get::<u64>(VISITS_KEY)?.unwrap_or(0) + 1;
    session.set(VISITS_KEY, visits);
    session.save().await?;
    Ok(Json(VisitsResponse { visits }))
}

/// Take the flash messages of a category.
pub async fn take_flashes(
    session: Session,
    Query(query): Query<FlashQuery>,
) -> Result<Json<FlashesResponse>, SessionError> {
    let category = query.category.as_deref();
    let messages = session
        .flashes(category)
        .iter()
        .filter_map(|flash| flash.cloned::<serde_json::Value>())
        .collect();
    session.save().await?;

    Ok(Json(FlashesResponse {
        category: category.unwrap_or(DEFAULT_FLASH_CATEGORY).to_string(),
        messages,
    }))
}

/// Queue a flash message.
pub async fn add_flash(
    session: Session,
    Query(query): Query<FlashQuery>,
    Json(req): Json<AddFlashRequest>,
) -> Result<StatusCode, SessionError> {
    session.add_flash(req.message, query.category.as_deref());
    session.save().await?;
    Ok(StatusCode::CREATED)
}
