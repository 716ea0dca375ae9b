//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router around a
//! chosen batch executor, so requests can be driven without a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use streamsift_core::{
    create_executor, BatchExecutor, Config, RankingConfig, ServerConfig, WorkerConfig, WorkerMode,
};

/// Re-export fixtures for test convenience
pub use streamsift_core::testing::fixtures;

/// Test fixture wrapping an in-process router.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_rank() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/rank", json!({
///         "expected": { "title": "Heat", "kind": "movie" },
///         "results": []
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a fixture with default ranking preferences and the thread executor.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            ranking: test_config.ranking,
            worker: WorkerConfig {
                mode: test_config.worker_mode,
                timeout_secs: test_config.timeout_secs,
            },
        };

        let executor: Arc<dyn BatchExecutor> = match test_config.executor {
            Some(executor) => executor,
            None => Arc::from(create_executor(&config.worker)),
        };

        let state = Arc::new(streamsift_server::state::AppState::new(config, executor));
        let router = streamsift_server::api::create_router(state);

        Self { router }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a plain-text body (used for `/metrics`).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
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

/// Configuration for test fixture.
#[derive(Clone)]
pub struct TestConfig {
    /// Ranking preferences loaded as if from config.toml
    pub ranking: RankingConfig,
    pub worker_mode: WorkerMode,
    /// Caller-side batch deadline
    pub timeout_secs: u64,
    /// Executor override; built from `worker_mode` when `None`
    pub executor: Option<Arc<dyn BatchExecutor>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            worker_mode: WorkerMode::Thread,
            timeout_secs: 5,
            executor: None,
        }
    }
}

impl TestConfig {
    /// Create config with the given ranking preferences.
    pub fn with_ranking(ranking: RankingConfig) -> Self {
        Self {
            ranking,
            ..Default::default()
        }
    }

    /// Create config that uses a custom executor.
    pub fn with_executor(executor: Arc<dyn BatchExecutor>) -> Self {
        Self {
            executor: Some(executor),
            ..Default::default()
        }
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
