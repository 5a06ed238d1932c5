//! Palace and flashcard API tests.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_create_palace_turns_objects_into_loci() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Biology basics", &["Lamp", " Desk ", ""]).await;

    assert_eq!(palace["title"], "Biology basics");
    assert_eq!(palace["theme"], "Biology");
    let loci = palace["loci"].as_array().unwrap();
    assert_eq!(loci.len(), 2);
    assert_eq!(loci[0]["objectName"], "Lamp");
    assert_eq!(loci[1]["objectName"], "Desk");
    assert_eq!(loci[0]["concept"], "");
    assert_eq!(palace["flashcards"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_palace_requires_title() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/palaces")
        .json(&fixtures::create_palace_request("   ", &["Lamp"]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_list_palaces_in_creation_order() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    common::create_palace(&server, "History", &["Door"]).await;
    let second = common::create_palace(&server, "Chemistry", &["Shelf"]).await;
    common::add_cards(&server, second["id"].as_str().unwrap(), 3).await;

    let response = server.get("/api/palaces").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let palaces = body["palaces"].as_array().unwrap();

    assert_eq!(palaces.len(), 2);
    assert_eq!(palaces[0]["title"], "History");
    assert_eq!(palaces[1]["title"], "Chemistry");
    assert_eq!(palaces[1]["cardCount"], 3);
    assert_eq!(palaces[1]["dueCount"], 3);
    assert_eq!(palaces[1]["locusCount"], 1);
}

#[tokio::test]
async fn test_get_unknown_palace_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server.get("/api/palaces/missing").await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_delete_palace() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Geography", &["Globe"]).await;
    let id = palace["id"].as_str().unwrap();

    server
        .delete(&format!("/api/palaces/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/palaces/{id}"))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/api/palaces/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_locus_anchors_concept() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Physics", &["Clock", "Mirror"]).await;
    let id = palace["id"].as_str().unwrap();
    let locus_id = palace["loci"][1]["id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/palaces/{id}/loci/{locus_id}"))
        .json(&fixtures::update_locus_request("Reflection"))
        .await;
    response.assert_status_ok();
    let locus: Value = response.json();
    assert_eq!(locus["concept"], "Reflection");
    assert_eq!(locus["objectName"], "Mirror");

    let stored: Value = server.get(&format!("/api/palaces/{id}")).await.json();
    assert_eq!(stored["loci"][1]["concept"], "Reflection");
    assert_eq!(stored["loci"][0]["concept"], "");
}

#[tokio::test]
async fn test_update_unknown_locus_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Physics", &["Clock"]).await;
    let id = palace["id"].as_str().unwrap();

    server
        .put(&format!("/api/palaces/{id}/loci/nowhere"))
        .json(&fixtures::update_locus_request("Time"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_locus_mnemonic_requires_anchored_concept() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Physics", &["Clock"]).await;
    let id = palace["id"].as_str().unwrap();
    let locus_id = palace["loci"][0]["id"].as_str().unwrap();

    server
        .post(&format!("/api/palaces/{id}/loci/{locus_id}/mnemonic"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generation_without_api_key_is_retryable() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Physics", &["Clock"]).await;
    let id = palace["id"].as_str().unwrap();

    let response = server.post(&format!("/api/palaces/{id}/analysis")).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "generation_failed");
    assert_eq!(body["retryable"], true);
}

#[tokio::test]
async fn test_add_flashcards_starts_them_due() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Spanish", &["Bed"]).await;
    let id = palace["id"].as_str().unwrap();
    let cards = common::add_cards(&server, id, 2).await;

    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["question"], "Question 1?");
    assert_eq!(cards[0]["repetitions"], 0);
    assert_eq!(cards[0]["interval"], 0);
    assert_eq!(cards[0]["easeFactor"], 2.5);

    let due: Value = server.get(&format!("/api/palaces/{id}/due")).await.json();
    assert_eq!(due["dueCount"], 2);
}

#[tokio::test]
async fn test_add_flashcard_without_answer_rejected() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Spanish", &["Bed"]).await;
    let id = palace["id"].as_str().unwrap();

    server
        .post(&format!("/api/palaces/{id}/flashcards"))
        .json(&serde_json::json!({ "cards": [{ "question": "Hola?", "answer": " " }] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let stored: Value = server.get(&format!("/api/palaces/{id}")).await.json();
    assert_eq!(stored["flashcards"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_generate_flashcards_needs_anchored_concepts() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Spanish", &["Bed", "Chair"]).await;
    let id = palace["id"].as_str().unwrap();

    server
        .post(&format!("/api/palaces/{id}/flashcards/generate"))
        .json(&serde_json::json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_and_clear_mnemonic() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Spanish", &["Bed"]).await;
    let id = palace["id"].as_str().unwrap();
    let cards = common::add_cards(&server, id, 1).await;
    let card_id = cards[0]["id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/palaces/{id}/flashcards/{card_id}/mnemonic"))
        .json(&serde_json::json!({ "mnemonic": "A giant bed singing" }))
        .await;
    response.assert_status_ok();
    let card: Value = response.json();
    assert_eq!(card["mnemonic"], "A giant bed singing");

    let response = server
        .put(&format!("/api/palaces/{id}/flashcards/{card_id}/mnemonic"))
        .json(&serde_json::json!({ "mnemonic": "" }))
        .await;
    let card: Value = response.json();
    assert!(card.get("mnemonic").is_none());
}

#[tokio::test]
async fn test_delete_flashcard() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Spanish", &["Bed"]).await;
    let id = palace["id"].as_str().unwrap();
    let cards = common::add_cards(&server, id, 2).await;
    let card_id = cards[0]["id"].as_str().unwrap();

    server
        .delete(&format!("/api/palaces/{id}/flashcards/{card_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stored: Value = server.get(&format!("/api/palaces/{id}")).await.json();
    let remaining = stored["flashcards"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["question"], "Question 2?");
}

/// Create a palace with its first locus anchored to `concept`.
async fn anchored_palace(server: &axum_test::TestServer, concept: &str) -> (String, String) {
    let palace = common::create_palace(server, "Biology basics", &["Lamp", "Desk"]).await;
    let id = palace["id"].as_str().unwrap().to_string();
    let locus_id = palace["loci"][0]["id"].as_str().unwrap().to_string();
    server
        .put(&format!("/api/palaces/{id}/loci/{locus_id}"))
        .json(&fixtures::update_locus_request(concept))
        .await
        .assert_status_ok();
    (id, locus_id)
}

#[tokio::test]
async fn test_feynman_chat_requires_anchored_concept() {
    let ctx = TestContext::with_generator(common::replying_generator("Tell me more!")).await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Biology basics", &["Lamp"]).await;
    let id = palace["id"].as_str().unwrap();
    let locus_id = palace["loci"][0]["id"].as_str().unwrap();

    server
        .post(&format!("/api/palaces/{id}/loci/{locus_id}/feynman"))
        .json(&fixtures::feynman_request(serde_json::json!([]), "It is about cells."))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feynman_chat_without_api_key() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (id, locus_id) = anchored_palace(&server, "Osmosis").await;

    let response = server
        .post(&format!("/api/palaces/{id}/loci/{locus_id}/feynman"))
        .json(&fixtures::feynman_request(serde_json::json!([]), "Water moves."))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "generation_failed");
}

#[tokio::test]
async fn test_feynman_chat_extends_history() {
    let ctx = TestContext::with_generator(common::replying_generator("Why does the water move?")).await;
    let server = ctx.server();
    let (id, locus_id) = anchored_palace(&server, "Osmosis").await;

    let history = serde_json::json!([
        { "role": "model", "text": "What is osmosis?" }
    ]);
    let response = server
        .post(&format!("/api/palaces/{id}/loci/{locus_id}/feynman"))
        .json(&fixtures::feynman_request(history, " Water crossing a membrane. "))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["reply"], "Why does the water move?");
    assert_eq!(
        body["history"],
        serde_json::json!([
            { "role": "model", "text": "What is osmosis?" },
            { "role": "user", "text": "Water crossing a membrane." },
            { "role": "model", "text": "Why does the water move?" }
        ])
    );
}

#[tokio::test]
async fn test_feynman_chat_rejects_empty_message() {
    let ctx = TestContext::with_generator(common::replying_generator("?")).await;
    let server = ctx.server();
    let (id, locus_id) = anchored_palace(&server, "Osmosis").await;

    server
        .post(&format!("/api/palaces/{id}/loci/{locus_id}/feynman"))
        .json(&fixtures::feynman_request(serde_json::json!([]), "   "))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_fills_loci_in_order() {
    let ctx =
        TestContext::with_generator(common::replying_generator(r#"["Cells", "DNA", "Enzymes"]"#))
            .await;
    let server = ctx.server();

    let palace = common::create_palace(&server, "Biology basics", &["Lamp", "Desk"]).await;
    let id = palace["id"].as_str().unwrap();

    let response = server.post(&format!("/api/palaces/{id}/analysis")).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["concepts"].as_array().unwrap().len(), 3);
    assert_eq!(body["palace"]["loci"][0]["concept"], "Cells");
    assert_eq!(body["palace"]["loci"][1]["concept"], "DNA");
}
