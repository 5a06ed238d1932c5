//! Flashcard endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use palace_core::{Card, SpacedRepetitionAlgorithm};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// Fewest anchored concepts worth generating cards from
const MIN_CONCEPTS_FOR_GENERATION: usize = 2;

/// POST /api/palaces/{id}/flashcards
pub async fn add(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
    Json(request): Json<AddFlashcardsRequest>,
) -> Result<(StatusCode, Json<FlashcardsResponse>)> {
    if request
        .cards
        .iter()
        .any(|c| c.question.trim().is_empty() || c.answer.trim().is_empty())
    {
        return Err(ApiError::BadRequest(
            "every card needs a question and an answer".to_string(),
        ));
    }

    let now = Utc::now();
    let cards: Vec<Card> = request
        .cards
        .into_iter()
        .map(|new| Card {
            mnemonic: new.mnemonic,
            source_error: new.source_error,
            ..new_card(&state, new.question, new.answer, now)
        })
        .collect();

    let cards = append(&state, &palace_id, cards).await?;
    Ok((StatusCode::CREATED, Json(FlashcardsResponse { cards })))
}

/// POST /api/palaces/{id}/flashcards/generate
pub async fn generate(
    State(state): State<AppState>,
    Path(palace_id): Path<String>,
    Json(request): Json<GenerateFlashcardsRequest>,
) -> Result<(StatusCode, Json<FlashcardsResponse>)> {
    let palace = state.store.palace(&palace_id).await?;
    let concepts = palace.anchored_concepts();
    if concepts.len() < MIN_CONCEPTS_FOR_GENERATION {
        return Err(ApiError::BadRequest(format!(
            "anchor at least {MIN_CONCEPTS_FOR_GENERATION} concepts before generating flashcards"
        )));
    }

    let count = request
        .count
        .unwrap_or(DEFAULT_GENERATED_CARDS)
        .clamp(1, MAX_GENERATED_CARDS);
    let generated = state
        .generator()?
        .generate_flashcards(&palace.theme, &concepts, count)
        .await?;

    let now = Utc::now();
    let cards = generated
        .into_iter()
        .filter(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty())
        .map(|c| new_card(&state, c.question, c.answer, now))
        .collect();

    let cards = append(&state, &palace_id, cards).await?;
    tracing::info!(%palace_id, generated = cards.len(), "flashcards generated");
    Ok((StatusCode::CREATED, Json(FlashcardsResponse { cards })))
}

/// PUT /api/palaces/{id}/flashcards/{card_id}/mnemonic
pub async fn set_mnemonic(
    State(state): State<AppState>,
    Path((palace_id, card_id)): Path<(String, String)>,
    Json(request): Json<SetMnemonicRequest>,
) -> Result<Json<Card>> {
    let mnemonic = Some(request.mnemonic).filter(|m| !m.trim().is_empty());
    let card = store_mnemonic(&state, &palace_id, &card_id, mnemonic).await?;
    Ok(Json(card))
}

/// POST /api/palaces/{id}/flashcards/{card_id}/mnemonic
pub async fn suggest_mnemonic(
    State(state): State<AppState>,
    Path((palace_id, card_id)): Path<(String, String)>,
) -> Result<Json<Card>> {
    let palace = state.store.palace(&palace_id).await?;
    let card = palace.card(&card_id)?;
    let mnemonic = state
        .generator()?
        .suggest_mnemonic(&card.question, &card.answer)
        .await?;

    let card = store_mnemonic(&state, &palace_id, &card_id, Some(mnemonic)).await?;
    Ok(Json(card))
}

/// DELETE /api/palaces/{id}/flashcards/{card_id}
///
/// Live sessions over the palace drop the card from their snapshot.
pub async fn delete(
    State(state): State<AppState>,
    Path((palace_id, card_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    // Same lock order as rating: sessions, then store
    let mut sessions = state.sessions.entries().await;
    state
        .store
        .update_palace(&palace_id, |palace| Ok(palace.remove_card(&card_id)?))
        .await?;

    for entry in sessions.values_mut().filter(|e| e.palace_id == palace_id) {
        entry.session.forget(&card_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

fn new_card(state: &AppState, question: String, answer: String, now: chrono::DateTime<Utc>) -> Card {
    Card {
        id: Uuid::new_v4().to_string(),
        question: question.trim().to_string(),
        answer: answer.trim().to_string(),
        mnemonic: None,
        source_error: None,
        review: state.scheduler.initial_state(now),
    }
}

async fn append(state: &AppState, palace_id: &str, cards: Vec<Card>) -> Result<Vec<Card>> {
    state
        .store
        .update_palace(palace_id, |palace| {
            palace.append_cards(cards.iter().cloned());
            Ok(())
        })
        .await?;
    Ok(cards)
}

async fn store_mnemonic(
    state: &AppState,
    palace_id: &str,
    card_id: &str,
    mnemonic: Option<String>,
) -> Result<Card> {
    state
        .store
        .update_palace(palace_id, |palace| {
            let card = palace.card_mut(card_id)?;
            card.mnemonic = mnemonic;
            Ok(card.clone())
        })
        .await
}
