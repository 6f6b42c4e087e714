//! History endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::history::Exchange;
use crate::{Result, Subject};

/// Build history router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/history/{subject}", get(read_history).delete(clear_history))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// A stored exchange tagged with the subject it was read from
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub exchange: Exchange,
    pub subject: Subject,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub subject: Subject,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub subject: Subject,
    pub cleared: usize,
}

/// Most recent exchanges for a subject, oldest first
async fn read_history(
    State(state): State<Arc<ApiState>>,
    Path(subject): Path<String>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>> {
    let subject: Subject = subject.parse()?;
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(state.default_read_limit);

    let history = state
        .store()
        .recent(subject, limit)
        .iter()
        .map(|exchange| HistoryEntry {
            exchange: exchange.clone(),
            subject,
        })
        .collect();

    Ok(Json(HistoryResponse { subject, history }))
}

async fn clear_history(
    State(state): State<Arc<ApiState>>,
    Path(subject): Path<String>,
) -> Result<Json<ClearResponse>> {
    let subject: Subject = subject.parse()?;
    let cleared = state.store().clear(subject);

    tracing::info!(%subject, cleared, "history cleared");
    Ok(Json(ClearResponse { subject, cleared }))
}
