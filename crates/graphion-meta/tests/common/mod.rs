//! Test utilities and common setup.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use graphion_meta::api;
use graphion_meta::session::{SessionRepository, SessionService};
use graphion_meta::store::{KvStore, MemoryStore};
use graphion_meta::user::StaticUserDirectory;

/// Create a test application backed by an in-memory store.
pub fn test_app() -> Router {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let repo = SessionRepository::new(store);
    let users = Arc::new(StaticUserDirectory::new(["root", "alice"]));
    let service = SessionService::new(repo, users);

    api::create_router(api::AppState::new(service))
}

/// Issue a JSON request against the router.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
