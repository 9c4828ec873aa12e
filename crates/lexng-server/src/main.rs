mod docx;
mod routes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use lexng_agent::{groq::GroqBackend, LegalService};
use lexng_core::{
    completion::{CompletionBackend, UnavailableBackend},
    config::Config,
    store::DocumentStore,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use routes::*;

/// Headroom for multipart framing and the other form fields.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub service: Arc<LegalService>,
    pub start_time: Instant,
    pub max_upload_bytes: usize,
    pub dev_diagnostics: bool,
}

pub(crate) fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;
    Router::new()
        // Health
        .route("/api/health", get(health))
        .route("/api/models", get(list_models))
        // Analysis
        .route("/api/analyze", post(analyze))
        // Documents
        .route("/api/documents", get(list_documents))
        .route("/api/documents/events", get(document_events))
        .route("/api/documents/sync", get(pull_documents).post(push_documents))
        .route(
            "/api/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/api/documents/:id/generate", post(generate_from_document))
        .route("/api/documents/:id/translate", post(translate_document))
        // Translation and drafting
        .route("/api/translate", post(translate))
        .route("/api/generate", post(generate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexng_server=info,lexng_agent=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env();

    let backend: Arc<dyn CompletionBackend> = if config.completion_configured() {
        info!(model = %config.default_model, "completion service configured");
        Arc::new(GroqBackend::from_config(&config))
    } else {
        warn!("GROQ_API_KEY not set, running with demo analysis and template drafting");
        Arc::new(UnavailableBackend::new("GROQ_API_KEY not set"))
    };

    let store = Arc::new(DocumentStore::new());
    let service = LegalService::new(&config, backend, store);

    let state = Arc::new(AppState {
        service: Arc::new(service),
        start_time: Instant::now(),
        max_upload_bytes: config.max_upload_bytes,
        dev_diagnostics: config.dev_diagnostics,
    });

    let app = router(state);

    let bind = config.web_bind.clone();
    let port = config.web_port;
    let addr = format!("{bind}:{port}");

    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
