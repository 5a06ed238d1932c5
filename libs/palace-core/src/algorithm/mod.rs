//! Spaced repetition scheduling.

pub mod sm2;

use crate::types::{Card, Rating, ReviewState};
use chrono::{DateTime, Utc};

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate the next review state after a rating.
    fn schedule(&self, state: &ReviewState, rating: Rating, now: DateTime<Utc>) -> ReviewState;

    /// Initial state for a card created at `now`.
    fn initial_state(&self, now: DateTime<Utc>) -> ReviewState;

    /// Apply a rating to a card, leaving everything but its review state untouched.
    fn rate(&self, card: &Card, rating: Rating, now: DateTime<Utc>) -> Card {
        Card {
            review: self.schedule(&card.review, rating, now),
            ..card.clone()
        }
    }
}

/// Rate a card with the default SM-2 parameters.
pub fn rate(card: &Card, rating: Rating, now: DateTime<Utc>) -> Card {
    sm2::Sm2::default().rate(card, rating, now)
}
