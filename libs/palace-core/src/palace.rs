//! Memory palaces: an image, the loci found in it, and the cards anchored there.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::queue;
use crate::types::Card;

/// Theme used when a palace title has no words.
const DEFAULT_THEME: &str = "Studies";

/// A physical spot in the palace image that holds one concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locus {
    pub id: String,
    pub object_name: String,
    /// Empty until a concept is anchored here.
    #[serde(default)]
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mental_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Locus {
    pub fn new(id: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_name: object_name.into(),
            concept: String::new(),
            mental_image: None,
            explanation: None,
        }
    }

    pub fn is_anchored(&self) -> bool {
        !self.concept.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palace {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub loci: Vec<Locus>,
    #[serde(default)]
    pub flashcards: Vec<Card>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review: DateTime<Utc>,
    #[serde(default)]
    pub review_level: u32,
}

impl Palace {
    /// New palace with one empty locus per object; the first palace review
    /// falls a day after creation.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        image_url: impl Into<String>,
        loci: Vec<Locus>,
        now: DateTime<Utc>,
    ) -> Self {
        let title = title.into();
        let theme = title
            .split_whitespace()
            .next()
            .unwrap_or(DEFAULT_THEME)
            .to_string();
        Self {
            id: id.into(),
            title,
            theme,
            description: description.into(),
            image_url: image_url.into(),
            loci,
            flashcards: Vec::new(),
            created_at: now,
            next_review: now + Duration::days(1),
            review_level: 0,
        }
    }

    /// Concepts of anchored loci, in locus order.
    pub fn anchored_concepts(&self) -> Vec<&str> {
        self.loci
            .iter()
            .filter(|locus| locus.is_anchored())
            .map(|locus| locus.concept.trim())
            .collect()
    }

    /// Write `concepts` into the loci in order, returning how many were
    /// placed. Concepts beyond the last locus are dropped.
    pub fn assign_concepts<S: AsRef<str>>(&mut self, concepts: &[S]) -> usize {
        let mut placed = 0;
        for (locus, concept) in self.loci.iter_mut().zip(concepts) {
            locus.concept = concept.as_ref().trim().to_string();
            placed += 1;
        }
        placed
    }

    pub fn due_cards(&self, now: DateTime<Utc>) -> Vec<&Card> {
        queue::select_due(&self.flashcards, now)
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        queue::due_count(&self.flashcards, now)
    }

    pub fn card(&self, card_id: &str) -> Result<&Card> {
        self.flashcards
            .iter()
            .find(|card| card.id == card_id)
            .ok_or_else(|| CoreError::CardNotFound(card_id.to_string()))
    }

    pub fn card_mut(&mut self, card_id: &str) -> Result<&mut Card> {
        self.flashcards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| CoreError::CardNotFound(card_id.to_string()))
    }

    /// Swap in an updated card, keeping its position.
    pub fn replace_card(&mut self, card: Card) -> Result<()> {
        let slot = self.card_mut(&card.id)?;
        *slot = card;
        Ok(())
    }

    pub fn append_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.flashcards.extend(cards);
    }

    pub fn remove_card(&mut self, card_id: &str) -> Result<Card> {
        let index = self
            .flashcards
            .iter()
            .position(|card| card.id == card_id)
            .ok_or_else(|| CoreError::CardNotFound(card_id.to_string()))?;
        Ok(self.flashcards.remove(index))
    }

    pub fn locus_mut(&mut self, locus_id: &str) -> Result<&mut Locus> {
        self.loci
            .iter_mut()
            .find(|locus| locus.id == locus_id)
            .ok_or_else(|| CoreError::LocusNotFound(locus_id.to_string()))
    }
}
