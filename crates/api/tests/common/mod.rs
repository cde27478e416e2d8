#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use steward_api::config::ServerConfig;
use steward_api::router::build_app_router;
use steward_api::state::AppState;
use steward_events::{ChangeBus, NotifyRelay};

/// Build a test `ServerConfig` with safe defaults.
///
/// No geocoding key and no sync providers, so nothing reaches the network.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        timeline_fetch_batch: 100,
        geocode_base_url: "http://127.0.0.1:9/geocode".to_string(),
        geocode_api_key: None,
        geocode_cache_capacity: 16,
        chat_sync: None,
        meeting_sync: None,
    }
}

/// State wired the same way `main.rs` wires it.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config(), Arc::new(ChangeBus::default()))
}

/// Start the notify relay for `state`'s pool and bus, as `main.rs` does.
///
/// Returns once the relay is listening; cancel the token to stop it.
pub async fn spawn_relay(state: &AppState) -> CancellationToken {
    let relay = NotifyRelay::listen(state.pool.clone()).await.unwrap();
    let cancel = CancellationToken::new();
    tokio::spawn(relay.run(Arc::clone(&state.change_bus), cancel.clone()));
    cancel
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(test_state(pool))
}

pub fn build_test_app_with(state: AppState) -> Router {
    build_app_router(state, &test_config()).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
