//! Aggregate progress figures for the performance dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::palace::Palace;
use crate::types::TestResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub tests_taken: usize,
    /// Rounded mean of all test scores, 0 without history.
    pub average_score: u8,
    pub palace_count: usize,
    /// Loci across all palaces with a concept anchored.
    pub anchored_concepts: usize,
    pub total_cards: usize,
    pub due_cards: usize,
}

pub fn summarize(palaces: &[Palace], history: &[TestResult], now: DateTime<Utc>) -> PerformanceSummary {
    let average_score = if history.is_empty() {
        0
    } else {
        let total: u64 = history.iter().map(|r| u64::from(r.score)).sum();
        (total as f64 / history.len() as f64).round() as u8
    };

    PerformanceSummary {
        tests_taken: history.len(),
        average_score,
        palace_count: palaces.len(),
        anchored_concepts: palaces.iter().map(|p| p.anchored_concepts().len()).sum(),
        total_cards: palaces.iter().map(|p| p.flashcards.len()).sum(),
        due_cards: palaces.iter().map(|p| p.due_count(now)).sum(),
    }
}
