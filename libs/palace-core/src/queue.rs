//! Due-card selection and the review session built on top of it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::Card;

/// Cards due at `now`, in input order.
pub fn select_due(cards: &[Card], now: DateTime<Utc>) -> Vec<&Card> {
    cards.iter().filter(|card| card.is_due(now)).collect()
}

/// Number of cards due at `now`.
pub fn due_count(cards: &[Card], now: DateTime<Utc>) -> usize {
    cards.iter().filter(|card| card.is_due(now)).count()
}

/// Where a review session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    InSession { index: usize },
    Complete,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::InSession { index } => write!(f, "in session at card {}", index + 1),
            Self::Complete => f.write_str("complete"),
        }
    }
}

/// Single pass over a snapshot of the due set.
///
/// The snapshot holds card ids taken when the session starts; ratings made
/// during the session never add or remove entries. Each recorded rating
/// advances the cursor by one and the session completes after the last card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    queue: Vec<String>,
    phase: SessionPhase,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            phase: SessionPhase::Idle,
        }
    }

    /// Snapshot the due set and begin at its first card.
    pub fn start(&mut self, cards: &[Card], now: DateTime<Utc>) -> SessionPhase {
        self.queue = select_due(cards, now)
            .into_iter()
            .map(|card| card.id.clone())
            .collect();
        self.phase = if self.queue.is_empty() {
            SessionPhase::Complete
        } else {
            SessionPhase::InSession { index: 0 }
        };
        self.phase
    }

    /// Convenience constructor for `new` followed by `start`.
    pub fn started(cards: &[Card], now: DateTime<Utc>) -> Self {
        let mut session = Self::new();
        session.start(cards, now);
        session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Card ids in review order.
    pub fn queue(&self) -> &[String] {
        &self.queue
    }

    /// Id of the card awaiting a rating.
    pub fn current(&self) -> Option<&str> {
        match self.phase {
            SessionPhase::InSession { index } => self.queue.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// One-based position of the current card and the session length.
    pub fn progress(&self) -> (usize, usize) {
        let position = match self.phase {
            SessionPhase::Idle => 0,
            SessionPhase::InSession { index } => index + 1,
            SessionPhase::Complete => self.queue.len(),
        };
        (position, self.queue.len())
    }

    /// Advance past the current card once its rating has been applied.
    pub fn record_rating(&mut self) -> Result<SessionPhase> {
        let SessionPhase::InSession { index } = self.phase else {
            return Err(CoreError::NoCurrentCard(self.phase));
        };
        let next = index + 1;
        self.phase = if next < self.queue.len() {
            SessionPhase::InSession { index: next }
        } else {
            SessionPhase::Complete
        };
        Ok(self.phase)
    }

    /// Drop a card that no longer exists from the snapshot.
    ///
    /// Cards before the cursor keep it pointing at the same unrated card;
    /// removing the last unrated card completes the session. Returns whether
    /// the card was part of the snapshot.
    pub fn forget(&mut self, card_id: &str) -> bool {
        let Some(pos) = self.queue.iter().position(|id| id == card_id) else {
            return false;
        };
        self.queue.remove(pos);
        if let SessionPhase::InSession { index } = self.phase {
            let index = if pos < index { index - 1 } else { index };
            self.phase = if index < self.queue.len() {
                SessionPhase::InSession { index }
            } else {
                SessionPhase::Complete
            };
        }
        true
    }

    /// Take a fresh snapshot after completion.
    pub fn restart(&mut self, cards: &[Card], now: DateTime<Utc>) -> Result<SessionPhase> {
        if self.phase != SessionPhase::Complete {
            return Err(CoreError::NotComplete(self.phase));
        }
        self.exit();
        Ok(self.start(cards, now))
    }

    /// Leave the session, abandoning any cards not yet rated.
    pub fn exit(&mut self) {
        self.queue.clear();
        self.phase = SessionPhase::Idle;
    }
}
