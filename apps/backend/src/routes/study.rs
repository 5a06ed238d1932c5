//! Study endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use palace_core::{Rating, ReviewSession, SpacedRepetitionAlgorithm};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::sessions::session_not_found;
use crate::AppState;

/// GET /api/palaces/{id}/due
pub async fn due(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
) -> Result<Json<DueCardsResponse>> {
    let palace = state.store.palace(&palace_id).await?;
    let cards: Vec<_> = palace.due_cards(Utc::now()).into_iter().cloned().collect();
    Ok(Json(DueCardsResponse {
        due_count: cards.len(),
        cards,
    }))
}

/// POST /api/palaces/{id}/sessions
pub async fn start(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let palace = state.store.palace(&palace_id).await?;
    let session = ReviewSession::started(&palace.flashcards, Utc::now());
    let response_session = session.clone();
    let session_id = state.sessions.insert(palace_id.clone(), session).await;

    tracing::info!(%session_id, %palace_id, cards = response_session.queue().len(), "review session started");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(session_id, &palace, &response_session)),
    ))
}

/// GET /api/sessions/{id}
pub async fn status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let entry = state.sessions.get(session_id).await?;
    let palace = state.store.palace(&entry.palace_id).await?;
    Ok(Json(SessionResponse::new(session_id, &palace, &entry.session)))
}

/// POST /api/sessions/{id}/rate
///
/// Reschedules the current card, persists it, then moves the session on.
pub async fn rate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RateRequest>,
) -> Result<Json<RateResponse>> {
    let rating: Rating = request.rating.parse()?;

    let mut sessions = state.sessions.entries().await;
    let entry = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    let card_id = entry
        .session
        .current()
        .ok_or_else(|| {
            ApiError::Conflict(format!("session is {}", entry.session.phase()))
        })?
        .to_string();

    let now = Utc::now();
    let scheduler = state.scheduler.clone();
    let (rated, palace) = state
        .store
        .update_palace(&entry.palace_id, |palace| {
            let rated = scheduler.rate(palace.card(&card_id)?, rating, now);
            palace.replace_card(rated.clone())?;
            Ok((rated, palace.clone()))
        })
        .await?;
    entry.session.record_rating()?;

    tracing::debug!(
        %session_id,
        card_id = %rated.id,
        %rating,
        interval = rated.review.interval,
        ease = rated.review.ease_factor,
        "card rated"
    );

    Ok(Json(RateResponse {
        session: SessionResponse::new(session_id, &palace, &entry.session),
        rated,
    }))
}

/// POST /api/sessions/{id}/restart
pub async fn restart(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let mut sessions = state.sessions.entries().await;
    let entry = sessions
        .get_mut(&session_id)
        .ok_or_else(|| session_not_found(session_id))?;
    let palace = state.store.palace(&entry.palace_id).await?;
    entry.session.restart(&palace.flashcards, Utc::now())?;
    Ok(Json(SessionResponse::new(session_id, &palace, &entry.session)))
}

/// DELETE /api/sessions/{id}
pub async fn exit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut entry = state.sessions.remove(session_id).await?;
    entry.session.exit();
    tracing::info!(%session_id, "review session closed");
    Ok(StatusCode::NO_CONTENT)
}
