//! API request and response types

use chrono::{DateTime, Utc};
use palace_core::{Card, Palace, ReviewSession, SessionPhase, TestResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export shared types from palace-core
pub use palace_core::{Locus, PerformanceSummary, Rating, TestKind};
pub use crate::services::generator::{ChatRole, ChatTurn};

pub const DEFAULT_GENERATED_CARDS: usize = 10;
pub const MAX_GENERATED_CARDS: usize = 50;
pub const MAX_TEST_ITEMS: usize = 100;

// === Palaces ===

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePalaceRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Objects that become the palace's loci, in order.
    pub objects: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePalaceRequest {
    pub title: String,
    pub description: String,
}

/// Dashboard row for one palace
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalaceSummary {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub image_url: String,
    pub locus_count: usize,
    pub anchored_concepts: usize,
    pub card_count: usize,
    pub due_count: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl PalaceSummary {
    pub fn from_palace(palace: &Palace, now: DateTime<Utc>) -> Self {
        Self {
            id: palace.id.clone(),
            title: palace.title.clone(),
            theme: palace.theme.clone(),
            image_url: palace.image_url.clone(),
            locus_count: palace.loci.len(),
            anchored_concepts: palace.anchored_concepts().len(),
            card_count: palace.flashcards.len(),
            due_count: palace.due_count(now),
            created_at: palace.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PalaceListResponse {
    pub palaces: Vec<PalaceSummary>,
}

/// Fields left out are not changed
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocusRequest {
    pub concept: Option<String>,
    pub mental_image: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub concepts: Vec<String>,
    pub palace: Palace,
}

// === Feynman chat ===

#[derive(Debug, Serialize, Deserialize)]
pub struct FeynmanRequest {
    /// Earlier turns, as returned by the previous call.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeynmanResponse {
    pub reply: String,
    /// The request history plus the new message and reply.
    pub history: Vec<ChatTurn>,
}

// === Flashcards ===

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    pub mnemonic: Option<String>,
    pub source_error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddFlashcardsRequest {
    pub cards: Vec<NewFlashcard>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateFlashcardsRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetMnemonicRequest {
    pub mnemonic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlashcardsResponse {
    pub cards: Vec<Card>,
}

// === Study ===

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCardsResponse {
    pub due_count: usize,
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateRequest {
    /// One of `again`, `hard`, `good`, `easy`.
    pub rating: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub palace_id: String,
    #[serde(flatten)]
    pub phase: SessionPhase,
    pub position: usize,
    pub total: usize,
    pub current_card: Option<Card>,
}

impl SessionResponse {
    pub fn new(session_id: Uuid, palace: &Palace, session: &ReviewSession) -> Self {
        let (position, total) = session.progress();
        let current_card = session
            .current()
            .and_then(|id| palace.card(id).ok())
            .cloned();
        Self {
            session_id,
            palace_id: palace.id.clone(),
            phase: session.phase(),
            position,
            total,
            current_card,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    /// The card as rescheduled by the rating
    pub rated: Card,
    pub session: SessionResponse,
}

// === Memorization tests ===

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateItemsRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateItemsResponse {
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub items: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Seconds spent memorizing
    pub time_taken: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResponse {
    pub result: TestResult,
    /// Per-position correctness, for highlighting the answer sheet
    pub correct: Vec<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub results: Vec<TestResult>,
}
