pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{Config, LedgerBackend},
    database::Database,
    handlers::{docs, files, health, storage as storage_handlers, webhook, AppState},
    services::{MemoryQuotaLedger, PgQuotaLedger, QuotaLedger},
    storage::{LocalObjectStore, ObjectStore},
};

/// Slack on top of the per-file limit for multipart framing.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Wires the ledger and object store selected by `config` into app state.
pub async fn build_state(config: Config) -> errors::Result<AppState> {
    let ledger: Arc<dyn QuotaLedger> = match config.ledger_backend {
        LedgerBackend::Postgres => {
            let database = Database::new(&config.database_url).await?;
            if config.run_migrations {
                database.migrate().await?;
                tracing::info!("Database migrations applied");
            }
            Arc::new(PgQuotaLedger::new(database))
        }
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory ledger; counters are lost on restart");
            Arc::new(MemoryQuotaLedger::new())
        }
    };

    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(&config.storage_dir)?);

    Ok(AppState::new(config, ledger, objects))
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/health", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route(
            "/api/storage",
            get(storage_handlers::get_storage).post(storage_handlers::update_storage),
        )
        .route("/api/storage/summary", get(storage_handlers::storage_summary))
        .route("/api/storage/reconcile", post(storage_handlers::reconcile_storage))
        .route("/api/webhook/clerk", post(webhook::identity_webhook))
        .route("/api/files", get(files::list_files).post(files::upload_files))
        .route(
            "/api/files/:name",
            delete(files::delete_file).patch(files::rename_file),
        )
        .route("/api/files/:name/url", get(files::signed_url))
        .route("/api/recent", get(files::recent_files))
        .route("/api/download", get(files::download))
        .merge(docs::create_docs_router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
