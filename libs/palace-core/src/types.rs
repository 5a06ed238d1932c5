//! Core record types shared by the scheduler, the review queue and the scorer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Answer button pressed after the card's answer is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Recall quality on the 0-5 SM-2 scale.
    pub(crate) fn quality(self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

impl FromStr for Rating {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" => Ok(Self::Again),
            "hard" => Ok(Self::Hard),
            "good" => Ok(Self::Good),
            "easy" => Ok(Self::Easy),
            other => Err(CoreError::UnknownRating(other.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spaced-repetition state carried by every card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_review: DateTime<Utc>,
    /// `None` means the card has never been scheduled and is always due.
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub next_review: Option<DateTime<Utc>>,
    /// Days until the next review.
    pub interval: u32,
    /// Consecutive successful reviews.
    pub repetitions: u32,
    pub ease_factor: f64,
}

impl ReviewState {
    /// Fresh state, due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_review: now,
            next_review: Some(now),
            interval: 0,
            repetitions: 0,
            ease_factor: 2.5,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            Some(next) => next <= now,
            None => true,
        }
    }
}

/// A question/answer unit under spaced-repetition scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    /// Test item this card was created to remediate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl Card {
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
            mnemonic: None,
            source_error: None,
            review: ReviewState::new(now),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.review.is_due(now)
    }
}

/// Kind of memorization trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    /// Concrete nouns.
    Words,
    /// Two-digit numbers.
    Numbers,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Numbers => "numbers",
        }
    }
}

impl FromStr for TestKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "words" => Ok(Self::Words),
            "numbers" => Ok(Self::Numbers),
            other => Err(CoreError::UnknownTestKind(other.to_string())),
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one memorization trial. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub item_count: usize,
    /// Memorization time in seconds.
    pub time_taken: u64,
    /// Percentage of items recalled, 0-100.
    pub score: u8,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_items: Vec<String>,
}
