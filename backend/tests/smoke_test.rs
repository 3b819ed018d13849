use std::sync::Arc;

use axum::body::Body;
use http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wallet_session_backend::store::{IdentityStore, SqliteIdentityStore};
use wallet_session_backend::test_util::{
    bearer, create_test_state, create_test_state_with_store, generate_expired_token,
};
use wallet_session_backend::{app, AppState};

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
    auth: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("Content-Type", "application/json");
    }
    if let Some(auth) = auth {
        builder = builder.header("Authorization", auth);
    }

    let req = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &axum::Router, wallet: &str) -> (StatusCode, Value) {
    let body = json!({ "wallet_address": wallet }).to_string();
    send(app, Method::POST, "/user/login", Some(&body), None).await
}

fn setup() -> (axum::Router, Arc<AppState>, Arc<wallet_session_backend::MemoryIdentityStore>) {
    let (state, store) = create_test_state();
    (app(state.clone()), state, store)
}

#[tokio::test]
async fn test_new_wallet_registers_with_201() {
    let (app, _state, store) = setup();
    let (status, body) = login(&app, "kaspa_newcomer").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User registered and logged in successfully");
    assert_eq!(body["data"]["publicKey"], "kaspa_newcomer");
    assert_eq!(body["data"]["permission"], "user");
    assert_eq!(body["data"]["joined"], true);
    assert_eq!(body["data"]["action"], "new_user_registered_and_login");
    assert!(body["data"]["token"].as_str().is_some());
    assert!(body["data"]["created_date"].as_str().is_some());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_existing_wallet_logs_in_with_200() {
    let (app, _state, store) = setup();
    let (_, first) = login(&app, "kaspa_abc").await;
    let (status, second) = login(&app, "kaspa_abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["action"], "existing_user_login");
    assert_eq!(second["data"]["id"], first["data"]["id"]);
    assert_eq!(second["data"]["created_date"], first["data"]["created_date"]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_root_login_route_matches_user_route() {
    let (app, _state, _store) = setup();
    let body = json!({ "wallet_address": "kaspa_root" }).to_string();
    let (status, _) = send(&app, Method::POST, "/login", Some(&body), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = login(&app, "kaspa_root").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_wallet_address() {
    let (app, _state, store) = setup();

    for body in [
        r#"{"wallet_address": ""}"#,
        r#"{"wallet_address": "   "}"#,
        r#"{"wallet_address": 123}"#,
        r#"{}"#,
        r#"not json"#,
    ] {
        let (status, json) = send(&app, Method::POST, "/user/login", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid input");
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_login_then_logout() {
    let (app, _state, store) = setup();
    let (_, login_body) = login(&app, "kaspa_abc").await;
    let token = login_body["data"]["token"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, "/user/logout", None, Some(&bearer(token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged out successfully");
    assert_eq!(body["data"]["publicKey"], "kaspa_abc");
    assert_eq!(body["data"]["joined"], false);
    assert!(body["data"]["loggedOutAt"].as_str().is_some());
    assert!(!store.find_by_wallet("kaspa_abc").await.unwrap().unwrap().joined);
}

#[tokio::test]
async fn test_logout_twice_still_succeeds() {
    let (app, _state, _store) = setup();
    let (_, login_body) = login(&app, "kaspa_abc").await;
    let auth = bearer(login_body["data"]["token"].as_str().unwrap());

    let (first, _) = send(&app, Method::POST, "/logout", None, Some(&auth)).await;
    let (second, _) = send(&app, Method::POST, "/logout", None, Some(&auth)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_valid_header() {
    let (app, _state, _store) = setup();

    for auth in [None, Some("Token abc"), Some("Bearer"), Some("Bearer a b"), Some("Bearer abc")] {
        let (status, body) = send(&app, Method::POST, "/user/logout", None, auth).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "auth: {:?}", auth);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authentication failed");
    }
}

#[tokio::test]
async fn test_logout_with_expired_token_is_unauthorized() {
    let (app, state, _store) = setup();
    let (_, login_body) = login(&app, "kaspa_abc").await;
    let id = login_body["data"]["id"].as_str().unwrap();

    let expired = generate_expired_token(&state, id, "kaspa_abc");
    let auth = bearer(&expired);
    let (status, body) = send(&app, Method::POST, "/user/logout", None, Some(&auth)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_logout_for_unknown_wallet_is_not_found() {
    let (app, state, _store) = setup();
    let token = state.sessions.tokens().issue("ghost", "kaspa_ghost").unwrap();

    let auth = bearer(&token);
    let (status, body) = send(&app, Method::POST, "/user/logout", None, Some(&auth)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_health_reports_store_state() {
    let (app, _state, store) = setup();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");

    store.close().await.unwrap();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn test_closed_store_login_is_internal_error() {
    let (app, _state, store) = setup();
    store.close().await.unwrap();

    let (status, body) = login(&app, "kaspa_abc").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "An unexpected error occurred");
}

#[tokio::test]
async fn test_network_probe() {
    let (app, _state, _store) = setup();
    let (status, body) = send(&app, Method::GET, "/api", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], true);
}

#[tokio::test]
async fn test_responses_carry_resource_policy_header() {
    let (app, _state, _store) = setup();
    let req = Request::builder().uri("/api").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(
        response.headers().get("cross-origin-resource-policy").unwrap(),
        "cross-origin"
    );
}

#[tokio::test]
async fn test_sqlite_backed_login_flow() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("users.db").display());
    let store: Arc<dyn IdentityStore> = Arc::new(SqliteIdentityStore::open(&url).unwrap());
    let app = app(create_test_state_with_store(store.clone()));

    let (status, first) = login(&app, "kaspa_disk").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = login(&app, "kaspa_disk").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["id"], second["data"]["id"]);

    let auth = bearer(second["data"]["token"].as_str().unwrap());
    let (status, _) = send(&app, Method::POST, "/user/logout", None, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!store.find_by_wallet("kaspa_disk").await.unwrap().unwrap().joined);
}
