//! Memorization test endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use palace_core::scoring;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/tests/items
pub async fn items(
    State(state): State<AppState>,
    Json(request): Json<GenerateItemsRequest>,
) -> Result<Json<GenerateItemsResponse>> {
    let kind: TestKind = request.kind.parse()?;
    if request.count == 0 || request.count > MAX_TEST_ITEMS {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {MAX_TEST_ITEMS}"
        )));
    }

    let items = state
        .generator()?
        .generate_test_items(kind, request.count)
        .await?;
    if items.is_empty() {
        return Err(ApiError::Generation("no test items returned".to_string()));
    }

    Ok(Json(GenerateItemsResponse { kind, items }))
}

/// POST /api/tests/results
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitTestRequest>,
) -> Result<(StatusCode, Json<SubmitTestResponse>)> {
    let kind: TestKind = request.kind.parse()?;

    let scorecard = scoring::grade(&request.items, &request.inputs);
    let correct = scorecard.correct.clone();
    let result = scorecard.into_result(
        Uuid::new_v4().to_string(),
        kind,
        request.time_taken,
        Utc::now(),
    );
    state.store.record_test_result(result.clone()).await?;

    tracing::info!(
        test_id = %result.id,
        kind = %result.kind,
        items = result.item_count,
        score = result.score,
        "test scored"
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitTestResponse {
            result,
            correct,
        }),
    ))
}

/// GET /api/tests/results
pub async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let results = state.store.history().await?;
    Ok(Json(HistoryResponse { results }))
}
