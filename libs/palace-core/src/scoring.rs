//! Scoring for memorization trials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TestKind, TestResult};

/// Per-position comparison of a trial's items against the recalled sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    /// Whether each original item was recalled, by position.
    pub correct: Vec<bool>,
    pub correct_count: usize,
    /// Rounded percentage, 0 for an empty trial.
    pub score: u8,
    /// Original items that were not recalled, in order.
    pub failed_items: Vec<String>,
}

impl Scorecard {
    pub fn item_count(&self) -> usize {
        self.correct.len()
    }

    /// Freeze the comparison into a history record.
    pub fn into_result(
        self,
        id: impl Into<String>,
        kind: TestKind,
        time_taken: u64,
        now: DateTime<Utc>,
    ) -> TestResult {
        TestResult {
            id: id.into(),
            kind,
            item_count: self.item_count(),
            time_taken,
            score: self.score,
            date: now,
            failed_items: self.failed_items,
        }
    }
}

/// Trim and lowercase an item for comparison.
pub fn normalize(item: &str) -> String {
    item.trim().to_lowercase()
}

/// Whether a recalled entry matches the original item.
pub fn matches(original: &str, recalled: &str) -> bool {
    normalize(original) == normalize(recalled)
}

/// Compare `items` against `inputs` position by position.
///
/// Missing inputs count as empty answers and surplus inputs are ignored.
pub fn grade<S, T>(items: &[S], inputs: &[T]) -> Scorecard
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let correct: Vec<bool> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let recalled = inputs.get(i).map(|input| input.as_ref()).unwrap_or("");
            matches(item.as_ref(), recalled)
        })
        .collect();

    let correct_count = correct.iter().filter(|ok| **ok).count();
    let failed_items = items
        .iter()
        .zip(&correct)
        .filter(|(_, ok)| !**ok)
        .map(|(item, _)| item.as_ref().to_string())
        .collect();

    Scorecard {
        score: percentage(correct_count, items.len()),
        correct,
        correct_count,
        failed_items,
    }
}

/// Score a trial and build its immutable result record.
pub fn score<S, T>(
    id: impl Into<String>,
    items: &[S],
    inputs: &[T],
    kind: TestKind,
    time_taken: u64,
    now: DateTime<Utc>,
) -> TestResult
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    grade(items, inputs).into_result(id, kind, time_taken, now)
}

fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u8
}
