pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use palace_core::{Sm2, SpacedRepetitionAlgorithm};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::generator::{GeminiClient, GeneratorError};
use crate::services::sessions::SessionRegistry;
use crate::services::store::ContentStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub sessions: Arc<SessionRegistry>,
    pub scheduler: Arc<dyn SpacedRepetitionAlgorithm>,
    pub generator: Option<Arc<GeminiClient>>,
}

impl AppState {
    pub fn new(db: Database, generator: Option<GeminiClient>) -> Self {
        Self {
            store: Arc::new(ContentStore::new(db)),
            sessions: Arc::new(SessionRegistry::new()),
            scheduler: Arc::new(Sm2::default()),
            generator: generator.map(Arc::new),
        }
    }

    /// The content generator, if one is configured.
    pub fn generator(&self) -> Result<&GeminiClient, GeneratorError> {
        self.generator.as_deref().ok_or(GeneratorError::NotConfigured)
    }
}

/// All API routes over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Palace routes
        .route(
            "/api/palaces",
            get(routes::palaces::list).post(routes::palaces::create),
        )
        .route("/api/palaces/generate", post(routes::palaces::generate))
        .route(
            "/api/palaces/{id}",
            get(routes::palaces::get).delete(routes::palaces::delete),
        )
        .route(
            "/api/palaces/{id}/loci/{locus_id}",
            put(routes::palaces::update_locus),
        )
        .route(
            "/api/palaces/{id}/loci/{locus_id}/mnemonic",
            post(routes::palaces::locus_mnemonic),
        )
        .route(
            "/api/palaces/{id}/loci/{locus_id}/feynman",
            post(routes::palaces::feynman),
        )
        .route("/api/palaces/{id}/analysis", post(routes::palaces::analyze))
        // Flashcard routes
        .route("/api/palaces/{id}/flashcards", post(routes::flashcards::add))
        .route(
            "/api/palaces/{id}/flashcards/generate",
            post(routes::flashcards::generate),
        )
        .route(
            "/api/palaces/{id}/flashcards/{card_id}",
            axum::routing::delete(routes::flashcards::delete),
        )
        .route(
            "/api/palaces/{id}/flashcards/{card_id}/mnemonic",
            put(routes::flashcards::set_mnemonic).post(routes::flashcards::suggest_mnemonic),
        )
        // Study routes
        .route("/api/palaces/{id}/due", get(routes::study::due))
        .route("/api/palaces/{id}/sessions", post(routes::study::start))
        .route(
            "/api/sessions/{id}",
            get(routes::study::status).delete(routes::study::exit),
        )
        .route("/api/sessions/{id}/rate", post(routes::study::rate))
        .route("/api/sessions/{id}/restart", post(routes::study::restart))
        // Memorization test routes
        .route("/api/tests/items", post(routes::trials::items))
        .route(
            "/api/tests/results",
            get(routes::trials::history).post(routes::trials::submit),
        )
        .route("/api/performance", get(routes::performance::summary))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Opening database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let generator = GeminiClient::from_config(&config.generator);
    if generator.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; content generation is disabled");
    }

    let state = AppState::new(db, generator);
    tracing::info!(scheduler = state.scheduler.name(), "Review scheduler ready");

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
