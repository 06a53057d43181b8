use crate::{AppState, SharedState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use justpos_core::state::{KeyValueStorage, MemoryStorage};
use std::sync::Arc;
use tower::ServiceExt;

/// App state over a fresh in-memory storage
pub fn memory_state() -> (SharedState, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let state = Arc::new(AppState::new(storage.clone()));
    (state, storage)
}

/// Storage that reads as empty and refuses every write
pub struct ReadOnlyStorage;

impl KeyValueStorage for ReadOnlyStorage {
    fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage is read-only")
    }
}

pub fn read_only_state() -> SharedState {
    Arc::new(AppState::new(Arc::new(ReadOnlyStorage)))
}

pub async fn send(router: &axum::Router, req: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, bytes.to_vec(), location)
}

pub async fn api(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    let (status, bytes, _) = send(router, builder.body(body).unwrap()).await;
    let json = if bytes.is_empty() {
        serde_json::json!(null)
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
    };
    (status, json)
}
