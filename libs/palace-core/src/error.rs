//! Error types for palace-core.

use thiserror::Error;

use crate::queue::SessionPhase;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised at the edges of the core: parsing user-facing labels and
/// driving a review session out of order. Scheduling and scoring never fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown rating: {0}")]
    UnknownRating(String),

    #[error("unknown test kind: {0}")]
    UnknownTestKind(String),

    #[error("no card awaiting a rating (session is {0})")]
    NoCurrentCard(SessionPhase),

    #[error("session can only be restarted once complete (session is {0})")]
    NotComplete(SessionPhase),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("locus not found: {0}")]
    LocusNotFound(String),
}
