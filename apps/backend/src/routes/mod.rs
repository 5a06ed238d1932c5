pub mod flashcards;
pub mod palaces;
pub mod performance;
pub mod study;
pub mod trials;
