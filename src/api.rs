// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::aggregate::{aggregate_with, AggregateRecord, MessageStats, SortOrder};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::fetcher::Fetcher;
use crate::snapshot::{FileSnapshotStore, SnapshotStore};
use crate::upstream::types::messages_from_slice;
use crate::upstream::{HttpTrendingSource, Message, TrendingSource};

#[derive(Clone)]
pub struct AppState {
    /// Backs `GET /data`.
    data: Fetcher,
    /// Backs `GET /stocktwits`.
    stocktwits: Fetcher,
    static_data: Arc<dyn SnapshotStore>,
    test_data: Arc<dyn SnapshotStore>,
    max_iterations: u32,
}

impl AppState {
    /// Production wiring: the configured StockTwits endpoint over HTTP.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let source =
            HttpTrendingSource::new(cfg.upstream_url.clone()).with_timeout(cfg.timeout_secs);
        Self::with_source(Arc::new(source), cfg)
    }

    /// Same routes and files as `from_config`, but pages come from `source`.
    pub fn with_source(source: Arc<dyn TrendingSource>, cfg: &AppConfig) -> Self {
        let data_store: Arc<dyn SnapshotStore> =
            Arc::new(FileSnapshotStore::new(cfg.data_snapshot.clone()));
        let stocktwits_store: Arc<dyn SnapshotStore> =
            Arc::new(FileSnapshotStore::new(cfg.stocktwits_snapshot.clone()));

        Self {
            data: Fetcher::new(source.clone(), data_store),
            stocktwits: Fetcher::new(source, stocktwits_store),
            static_data: Arc::new(FileSnapshotStore::new(cfg.static_data.clone())),
            test_data: Arc::new(FileSnapshotStore::new(cfg.test_data.clone())),
            max_iterations: cfg.max_iterations,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/data", get(live_data))
        .route("/stocktwits", get(live_stocktwits))
        .route("/stocktwits/testdata", get(saved_test_data))
        .route("/testdata", get(saved_test_data))
        .route("/dummydata", get(saved_static_data))
        .route("/aggregate", get(aggregate_dataset))
        .route("/random", get(random_dataset))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn live_data(State(state): State<AppState>) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.data.fetch(state.max_iterations).await?))
}

async fn live_stocktwits(State(state): State<AppState>) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.stocktwits.fetch(state.max_iterations).await?))
}

/// Saved snapshots are passed through byte for byte.
async fn serve_saved(store: &dyn SnapshotStore) -> Result<impl IntoResponse, AppError> {
    let body = store.load_raw().await.map_err(AppError::Snapshot)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

async fn saved_test_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    serve_saved(state.test_data.as_ref()).await
}

async fn saved_static_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    serve_saved(state.static_data.as_ref()).await
}

#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum Dataset {
    #[default]
    Dummy,
    Test,
    Live,
}

#[derive(Debug, serde::Deserialize)]
struct AggregateQuery {
    #[serde(default)]
    dataset: Dataset,
    #[serde(default)]
    sort: SortOrder,
}

#[derive(serde::Serialize)]
struct AggregateResp {
    records: Vec<AggregateRecord>,
    stats: MessageStats,
}

async fn load_messages(store: &dyn SnapshotStore) -> Result<Vec<Message>, AppError> {
    let raw = store.load_raw().await.map_err(AppError::Snapshot)?;
    messages_from_slice(&raw)
        .map_err(|e| AppError::Snapshot(anyhow::Error::new(e).context(store.describe())))
}

async fn aggregate_dataset(
    State(state): State<AppState>,
    Query(q): Query<AggregateQuery>,
) -> Result<Json<AggregateResp>, AppError> {
    let messages = match q.dataset {
        Dataset::Dummy => load_messages(state.static_data.as_ref()).await?,
        Dataset::Test => load_messages(state.test_data.as_ref()).await?,
        Dataset::Live => state.data.fetch(state.max_iterations).await?,
    };
    tracing::debug!(dataset = ?q.dataset, sort = ?q.sort, messages = messages.len(), "aggregating");

    Ok(Json(AggregateResp {
        records: aggregate_with(&messages, q.sort),
        stats: MessageStats::from_messages(&messages),
    }))
}

async fn random_dataset() -> Json<Vec<AggregateRecord>> {
    Json(crate::random::random_records(&mut rand::rng()))
}
