use crate::store::SqliteStore;
use crate::MonitorError;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub const SERVICE_NAME: &str = "news-grammar-monitor";

/// Static facts about the running monitor reported by `/status`.
#[derive(Debug, Clone, Default)]
pub struct ServiceInfo {
    pub target_url: String,
    pub model: String,
    pub notifiers: Vec<String>,
    pub check_interval_minutes: u64,
}

#[derive(Clone)]
pub struct HealthState {
    store: Arc<SqliteStore>,
    info: Arc<ServiceInfo>,
}

impl HealthState {
    pub fn new(store: Arc<SqliteStore>, info: ServiceInfo) -> Self {
        HealthState {
            store,
            info: Arc::new(info),
        }
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .with_state(state)
}

pub async fn serve(port: u16, state: HealthState) -> Result<(), MonitorError> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health check server listening on port {}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
    }))
}

async fn status(State(state): State<HealthState>) -> (StatusCode, Json<Value>) {
    match status_report(&state).await {
        Ok(report) => (StatusCode::OK, Json(report)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "status": "error",
                "timestamp": Utc::now().to_rfc3339(),
                "error": e.to_string(),
            })),
        ),
    }
}

async fn status_report(state: &HealthState) -> Result<Value, MonitorError> {
    let total = state.store.count().await?;
    let recent = state.store.count_since(Utc::now() - Duration::hours(24)).await?;
    let last = state.store.last_processed().await?.map(|a| {
        json!({
            "url": a.url,
            "processed_at": a.processed_at.to_rfc3339(),
            "status": a.status,
        })
    });

    Ok(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": SERVICE_NAME,
        "database": {
            "status": "healthy",
            "total_articles": total,
        },
        "recent_activity": {
            "articles_last_24h": recent,
            "last_article": last,
        },
        "environment": {
            "target_url": state.info.target_url,
            "model": state.info.model,
            "notifiers": state.info.notifiers,
            "check_interval": state.info.check_interval_minutes,
        },
    }))
}
