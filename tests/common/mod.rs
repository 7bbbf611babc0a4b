//! Test helpers for HTTP integration tests.
//!
//! Provides a TestApp wrapping an axum-test server over an in-memory
//! database, a temporary storage root and a manually driven session clock.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use axum_test::{TestRequest, TestServer};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tempfile::TempDir;

use stash::cache::{CacheStore, ManualClock, MemoryCache};
use stash::web::router::{create_health_router, create_router};
use stash::{
    create_user, AppState, Database, FileStorage, JobQueue, ProcessingDispatcher, SessionStore,
    StashError,
};

/// Password used for every test account.
pub const PASSWORD: &str = "toto1234!";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub clock: Arc<ManualClock>,
    pub dispatcher: ProcessingDispatcher,
    pub storage: FileStorage,
    _temp: TempDir,
}

impl TestApp {
    /// Create a test application with an empty database.
    pub async fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));
        Self::with_cache(clock, cache).await
    }

    /// Create a test application whose session cache is unreachable.
    pub async fn with_cache_down() -> Self {
        Self::with_cache(Arc::new(ManualClock::default()), Arc::new(DownCache)).await
    }

    async fn with_cache(clock: Arc<ManualClock>, cache: Arc<dyn CacheStore>) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");

        let storage = FileStorage::new(temp.path().join("files_manager"));
        let dispatcher = ProcessingDispatcher::new(JobQueue::new(&db));

        let state = Arc::new(AppState::new(
            db.clone(),
            SessionStore::new(cache),
            storage.clone(),
            dispatcher.clone(),
        ));
        let router = create_router(state, &[]).merge(create_health_router());
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            db,
            clock,
            dispatcher,
            storage,
            _temp: temp,
        }
    }

    /// Register a user directly in the database and return its ID.
    pub async fn create_user(&self, email: &str) -> i64 {
        create_user(&self.db, email, PASSWORD)
            .await
            .expect("Failed to create user")
            .id
    }

    /// Log in with Basic credentials and return the session token.
    pub async fn connect(&self, email: &str) -> String {
        let response = self
            .server
            .get("/connect")
            .add_header(AUTHORIZATION, basic_auth(email, PASSWORD))
            .await;
        response.assert_status_ok();

        response.json::<Value>()["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }

    /// Create a user and log in.
    pub async fn login(&self, email: &str) -> (i64, String) {
        let user_id = self.create_user(email).await;
        let token = self.connect(email).await;
        (user_id, token)
    }

    /// Upload a record and return the JSON response, asserting 201.
    pub async fn upload(&self, token: &str, body: Value) -> Value {
        let response = with_token(self.server.post("/files"), token).json(&body).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()
    }
}

/// Session cache whose every operation fails.
struct DownCache;

impl CacheStore for DownCache {
    fn get(&self, _key: &str) -> stash::Result<Option<String>> {
        Err(StashError::Cache("connection refused".to_string()))
    }
    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> stash::Result<()> {
        Err(StashError::Cache("connection refused".to_string()))
    }
    fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> stash::Result<bool> {
        Err(StashError::Cache("connection refused".to_string()))
    }
    fn delete(&self, _key: &str) -> stash::Result<bool> {
        Err(StashError::Cache("connection refused".to_string()))
    }
}

/// Build a `Basic` authorization header value.
pub fn basic_auth(email: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

/// Attach a session token to a request.
pub fn with_token(request: TestRequest, token: &str) -> TestRequest {
    request.add_header("X-Token", token.to_string())
}
