//! API integration tests.
//!
//! These tests drive the demo router end-to-end using axum's test utilities,
//! carrying the session cookie from one response into the next request.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use request_sessions::api::{create_router, create_router_with_state, AppState, SessionSettings};
use request_sessions::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a JSON request, optionally carrying a cookie.
fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to extract JSON from response.
async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Helper to turn a `Set-Cookie` header into a `Cookie` header value.
fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response sets the session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = create_router_with_state(
        AppState::with_store(store.clone()),
        &SessionSettings::default(),
    );
    (app, store)
}

// ============================================================================
// Health & Info Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_router();

    let response = app
        .oneshot(json_request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn test_api_info_endpoint() {
    let app = create_router();

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["name"], "request-sessions");
    assert_eq!(json["status"], "running");
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_new_session_info() {
    let (app, store) = test_app();

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/session", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // Reading does not persist anything
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let json = response_json(response).await;
    assert_eq!(json["is_new"], true);
    assert!(json["session_id"].as_str().unwrap().starts_with("sess-"));
    assert_eq!(json["keys"], json!([]));
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn test_visits_persist_across_requests() {
    let (app, store) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/session/visits", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert_eq!(response_json(response).await["visits"], 1);

    for expected in 2..=3 {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::GET,
                "/api/v1/session/visits",
                Some(&cookie),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response_json(response).await["visits"], expected);
    }

    assert_eq!(store.count(), 1);
}

#[tokio::test]
async fn test_value_roundtrip() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/session/values/profile",
            None,
            Some(json!({"value": {"name": "ada", "langs": ["rust"]}})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/values/profile",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["key"], "profile");
    assert_eq!(json["value"]["name"], "ada");
    assert_eq!(json["value"]["langs"][0], "rust");

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/session", Some(&cookie), None))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["is_new"], false);
    assert_eq!(json["keys"], json!(["profile"]));
}

#[tokio::test]
async fn test_missing_value_is_404() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/values/nothing",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = response_json(response).await;
    assert_eq!(json["code"], "KEY_NOT_FOUND");
}

#[tokio::test]
async fn test_type_mismatch_is_500() {
    let (app, _store) = test_app();

    // The visit counter is stored as a u64, not as JSON
    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/session/visits", None, None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/values/visits",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["code"], "TYPE_MISMATCH");
    let details = json["details"].as_str().unwrap();
    assert!(details.starts_with("expected "));
    assert!(details.contains("Value"));
    assert!(details.contains("found u64"));
}

#[tokio::test]
async fn test_delete_and_clear_values() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            "/api/v1/session/values/aaa",
            None,
            Some(json!({"value": 100})),
        ))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    for key in ["bbb", "ccc"] {
        app.clone()
            .oneshot(json_request(
                Method::PUT,
                &format!("/api/v1/session/values/{}", key),
                Some(&cookie),
                Some(json!({"value": 200})),
            ))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/session/values/aaa",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/session", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["keys"], json!(["bbb", "ccc"]));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/session/values",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/session", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["keys"], json!([]));
}

#[tokio::test]
async fn test_flashes_are_read_once() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/session/flashes",
            None,
            Some(json!({"message": "saved"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/session/flashes?category=errors",
            Some(&cookie),
            Some(json!({"message": "oops"})),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/flashes",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["category"], "_flash");
    assert_eq!(json["messages"], json!(["saved"]));

    let response = app
        .clone()
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/flashes",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["messages"], json!([]));

    let response = app
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/flashes?category=errors",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    let json = response_json(response).await;
    assert_eq!(json["category"], "errors");
    assert_eq!(json["messages"], json!(["oops"]));
}

#[tokio::test]
async fn test_destroy_session() {
    let (app, store) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/session/visits", None, None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);
    assert_eq!(store.count(), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/api/v1/session",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let expired = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(expired.contains("Max-Age=0"));
    assert_eq!(store.count(), 0);

    // The old cookie now starts over
    let response = app
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session/visits",
            Some(&cookie),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response_json(response).await["visits"], 1);
}

#[tokio::test]
async fn test_tampered_cookie_is_rejected() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(json_request(
            Method::GET,
            "/api/v1/session",
            Some("sid=forged-value"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["code"], "SESSION_STORE_ERROR");
}

#[tokio::test]
async fn test_custom_cookie_name() {
    let settings = SessionSettings {
        cookie_name: "app.sid".to_string(),
        ..SessionSettings::default()
    };
    let app = create_router_with_state(AppState::new(), &settings);

    let response = app
        .oneshot(json_request(Method::GET, "/api/v1/session/visits", None, None))
        .await
        .unwrap();

    assert!(session_cookie(&response).starts_with("app.sid=sess-"));
}
