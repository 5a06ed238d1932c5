//! Core library for the memory palace trainer.
//!
//! Provides:
//! - SM-2 review scheduling over four answer buttons
//! - Due-card selection and single-pass review sessions
//! - Scoring for word and number memorization trials
//! - Shared records (Palace, Locus, Card, TestResult)

pub mod algorithm;
pub mod error;
pub mod palace;
pub mod queue;
pub mod scoring;
pub mod stats;
pub mod types;

pub use algorithm::{rate, sm2::Sm2, SpacedRepetitionAlgorithm};
pub use error::{CoreError, Result};
pub use palace::{Locus, Palace};
pub use queue::{due_count, select_due, ReviewSession, SessionPhase};
pub use scoring::{grade, normalize, score, Scorecard};
pub use stats::{summarize, PerformanceSummary};
pub use types::{Card, Rating, ReviewState, TestKind, TestResult};
