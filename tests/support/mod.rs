#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt; // for oneshot

use waitlist_api::config::AppConfig;
use waitlist_api::create_app;
use waitlist_api::domain::NewRegistrant;
use waitlist_api::models::registrant::Registrant;
use waitlist_api::store::{MemoryStore, RegistrantStore, StoreError, UniquenessScope};

pub fn config(unique_phone: bool) -> AppConfig {
    AppConfig {
        unique_phone,
        ..AppConfig::default()
    }
}

pub fn memory_app(unique_phone: bool) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (create_app(&config(unique_phone), store.clone()), store)
}

pub fn ann() -> Value {
    serde_json::json!({
        "firstName": "Ann",
        "lastName": "Lee",
        "email": "Ann.Lee@gmail.com",
        "phone": "5551234567"
    })
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub async fn post_register(app: &Router, body: &Value) -> (StatusCode, Value) {
    post_raw(app, serde_json::to_vec(body).unwrap()).await
}

pub async fn post_raw(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    post_with_content_type(app, Some("application/json"), body).await
}

pub async fn post_with_content_type(
    app: &Router,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(Method::POST).uri("/api/register");
    if let Some(content_type) = content_type {
        req = req.header("content-type", content_type);
    }
    send(app, req.body(body.into()).unwrap()).await
}

/// Counts every store call and forwards to an in-memory store.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub calls: AtomicUsize,
}

impl RecordingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistrantStore for RecordingStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email(email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Registrant>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_phone(phone).await
    }

    async fn insert(&self, r: &NewRegistrant, scope: UniquenessScope) -> Result<Registrant, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(r, scope).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Lookups never see existing rows, as if a concurrent request inserted
/// between the duplicate check and the insert.
#[derive(Default)]
pub struct RacyStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl RegistrantStore for RacyStore {
    async fn find_by_email(&self, _: &str) -> Result<Option<Registrant>, StoreError> {
        Ok(None)
    }

    async fn find_by_phone(&self, _: &str) -> Result<Option<Registrant>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, r: &NewRegistrant, scope: UniquenessScope) -> Result<Registrant, StoreError> {
        self.inner.insert(r, scope).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Every call fails like a lost database connection.
pub struct BrokenStore;

#[async_trait]
impl RegistrantStore for BrokenStore {
    async fn find_by_email(&self, _: &str) -> Result<Option<Registrant>, StoreError> {
        Err(StoreError::Unavailable("connection reset by db-primary:3306".into()))
    }

    async fn find_by_phone(&self, _: &str) -> Result<Option<Registrant>, StoreError> {
        Err(StoreError::Unavailable("connection reset by db-primary:3306".into()))
    }

    async fn insert(&self, _: &NewRegistrant, _: UniquenessScope) -> Result<Registrant, StoreError> {
        Err(StoreError::Unavailable("connection reset by db-primary:3306".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset by db-primary:3306".into()))
    }
}
