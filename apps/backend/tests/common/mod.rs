//! Common test utilities and fixtures for integration tests.
//!
//! Every context runs on its own in-memory SQLite database. Content
//! generation is either switched off or pointed at a local stand-in server,
//! so no environment setup is needed.

pub mod fixtures;

use axum::Router;
use axum_test::TestServer;
use serde_json::Value;

use mnemosine_backend::config::GeneratorConfig;
use mnemosine_backend::db::Database;
use mnemosine_backend::services::generator::GeminiClient;
use mnemosine_backend::{router, AppState};

/// Test context holding a fresh database behind the full router.
pub struct TestContext {
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if the in-memory database cannot be opened or migrated.
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Create a test context whose content generator talks to `stub`.
    pub async fn with_generator(stub: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub generator");
        let addr = listener.local_addr().expect("Stub generator has no address");
        tokio::spawn(async move { axum::serve(listener, stub).await });

        let config = GeneratorConfig {
            api_key: Some("test-key".to_string()),
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::from_config(&config)
            .expect("Generator config has a key")
            .with_base_url(format!("http://{addr}"));
        Self::build(Some(client)).await
    }

    async fn build(generator: Option<GeminiClient>) -> Self {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let app = router(AppState::new(db, generator));
        Self { app }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.app.clone()).expect("Failed to start test server")
    }
}

/// Create a palace with the given objects as loci and return its JSON.
pub async fn create_palace(server: &TestServer, title: &str, objects: &[&str]) -> Value {
    let response = server
        .post("/api/palaces")
        .json(&fixtures::create_palace_request(title, objects))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}

/// Add `count` hand-written cards to a palace and return their JSON.
pub async fn add_cards(server: &TestServer, palace_id: &str, count: usize) -> Vec<Value> {
    let response = server
        .post(&format!("/api/palaces/{palace_id}/flashcards"))
        .json(&fixtures::add_flashcards_request(count))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["cards"].as_array().cloned().unwrap_or_default()
}

/// Stand-in generator that answers every call with `text`.
pub fn replying_generator(text: &'static str) -> Router {
    Router::new().fallback(move || async move {
        axum::Json(serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        }))
    })
}

/// Stand-in generator that fails every call with `status`.
pub fn failing_generator(status: axum::http::StatusCode) -> Router {
    Router::new().fallback(move || async move { (status, "upstream unavailable") })
}
