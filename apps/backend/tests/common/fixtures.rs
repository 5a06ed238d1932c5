//! Request bodies shared by the integration tests.

use serde_json::{json, Value};

/// Body for `POST /api/palaces`.
pub fn create_palace_request(title: &str, objects: &[&str]) -> Value {
    json!({
        "title": title,
        "description": format!("A quiet room for {title}"),
        "imageUrl": "https://example.com/room.png",
        "objects": objects,
    })
}

/// Body for `POST /api/palaces/{id}/flashcards` with numbered cards.
pub fn add_flashcards_request(count: usize) -> Value {
    let cards: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "question": format!("Question {i}?"),
                "answer": format!("Answer {i}."),
            })
        })
        .collect();
    json!({ "cards": cards })
}

pub fn rate_request(rating: &str) -> Value {
    json!({ "rating": rating })
}

pub fn update_locus_request(concept: &str) -> Value {
    json!({ "concept": concept })
}

/// Body for `POST /api/tests/results`.
pub fn submit_test_request(kind: &str, items: &[&str], inputs: &[&str], time_taken: u64) -> Value {
    json!({
        "type": kind,
        "items": items,
        "inputs": inputs,
        "timeTaken": time_taken,
    })
}

/// Body for `POST /api/palaces/{id}/loci/{locus_id}/feynman`.
pub fn feynman_request(history: Value, message: &str) -> Value {
    json!({ "history": history, "message": message })
}
