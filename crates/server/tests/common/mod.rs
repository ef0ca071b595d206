//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the full router around a
//! controllable catalog, so every endpoint can be exercised without binding a
//! socket.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use cinelinks_core::config::ServerConfig;
use cinelinks_core::{
    testing::MockCatalog, AdminConfig, AdminKeyAuthenticator, CatalogEntry, CatalogStore, Config,
    DatabaseConfig, NewCatalogEntry,
};

/// Re-export fixtures for test convenience
pub use cinelinks_core::testing::fixtures;

/// Admin key configured on every fixture.
pub const ADMIN_KEY: &str = "test-admin-key";

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_create_entry() {
///     let fixture = TestFixture::new();
///
///     let response = fixture
///         .admin_post("/api/v1/catalog", json!(fixtures::new_movie("RRR")))
///         .await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Catalog behind the router - seed entries or inject failures
    pub catalog: Arc<MockCatalog>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with an empty catalog.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a fixture that also serves a frontend bundle from `assets`.
    pub fn with_assets(assets: impl Into<PathBuf>) -> Self {
        Self::build(Some(assets.into()))
    }

    fn build(assets: Option<PathBuf>) -> Self {
        let catalog = Arc::new(MockCatalog::new());

        let config = Config {
            admin: AdminConfig {
                key: ADMIN_KEY.to_string(),
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                assets,
            },
            database: DatabaseConfig::default(),
        };

        let state = Arc::new(cinelinks_server::state::AppState::new(
            config,
            Arc::new(AdminKeyAuthenticator::new(ADMIN_KEY.to_string())),
            Arc::clone(&catalog) as Arc<dyn CatalogStore>,
        ));

        let router = cinelinks_server::api::create_router(state);

        Self { router, catalog }
    }

    /// Store an entry directly, bypassing the API.
    pub fn seed(&self, entry: NewCatalogEntry) -> CatalogEntry {
        self.catalog.create(entry).expect("Failed to seed entry")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, None).await
    }

    /// Send a PATCH request without a body.
    pub async fn patch(&self, path: &str) -> TestResponse {
        self.request("PATCH", path, None, None).await
    }

    /// Send a GET request carrying the admin key.
    pub async fn admin_get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, Some(ADMIN_KEY)).await
    }

    /// Send a POST request with JSON body carrying the admin key.
    pub async fn admin_post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), Some(ADMIN_KEY)).await
    }

    /// Send a PUT request with JSON body carrying the admin key.
    pub async fn admin_put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body), Some(ADMIN_KEY)).await
    }

    /// Send a DELETE request carrying the admin key.
    pub async fn admin_delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None, Some(ADMIN_KEY)).await
    }

    /// Send a PATCH request carrying the admin key.
    pub async fn admin_patch(&self, path: &str) -> TestResponse {
        self.request("PATCH", path, None, Some(ADMIN_KEY)).await
    }

    /// Send a request with an explicit admin key header value.
    pub async fn with_key(&self, method: &str, path: &str, key: &str) -> TestResponse {
        self.request(method, path, None, Some(key)).await
    }

    /// Send an admin POST with raw string body (for testing malformed JSON).
    pub async fn admin_post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .header("X-Admin-Key", ADMIN_KEY)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Send a GET request and return the body as text (for non-JSON responses).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        admin_key: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        if let Some(key) = admin_key {
            request_builder = request_builder.header("X-Admin-Key", key);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
