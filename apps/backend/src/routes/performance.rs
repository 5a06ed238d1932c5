//! Performance endpoint

use axum::{extract::State, Json};
use chrono::Utc;

use crate::error::Result;
use crate::models::PerformanceSummary;
use crate::AppState;

/// GET /api/performance
pub async fn summary(State(state): State<AppState>) -> Result<Json<PerformanceSummary>> {
    let palaces = state.store.palaces().await?;
    let history = state.store.history().await?;
    Ok(Json(palace_core::summarize(&palaces, &history, Utc::now())))
}
