//! HTTP surface tests against the real router with fake collaborators.

mod common;

use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use common::{CannedVision, FakeEmbedder, FakeObjectStore, InMemoryStore};
use recall::pipeline::CapturePipeline;
use recall::server::build_router;
use recall::{AppState, persistence::MemoryStore};
use serde_json::{Value, json};
use std::sync::Arc;

fn test_server(vision: CannedVision) -> (Arc<InMemoryStore>, TestServer) {
    let store = Arc::new(InMemoryStore::default());
    let pipeline = Arc::new(CapturePipeline::new(
        Arc::new(FakeObjectStore::default()),
        Arc::new(vision),
        Arc::new(FakeEmbedder { dimension: 768 }),
        Arc::clone(&store) as Arc<dyn MemoryStore>,
    ));
    let app = build_router(AppState { pipeline }, None);
    (store, TestServer::new(app).expect("failed to start test server"))
}

fn screenshot_form(user_id: Option<&str>) -> MultipartForm {
    let mut form = MultipartForm::new().add_part(
        "screenshot",
        Part::bytes(vec![0xFFu8; 64])
            .file_name("screenshot.png")
            .mime_type("image/png"),
    );
    if let Some(id) = user_id {
        form = form.add_text("userId", id);
    }
    form
}

#[tokio::test]
async fn health_answers_plainly() {
    let (_store, server) = test_server(CannedVision::json());
    let res = server.get("/health").await;
    res.assert_status_ok();
    assert_eq!(res.text(), "Recall backend is healthy");
}

#[tokio::test]
async fn process_screenshot_returns_image_url_and_analysis() {
    let (store, server) = test_server(CannedVision::json());

    let res = server
        .post("/process-screenshot")
        .multipart(screenshot_form(Some("user-7")))
        .await;

    res.assert_status_ok();
    let body: Value = res.json();
    assert_eq!(body["message"], "Screenshot processed successfully");
    assert!(
        body["data"]["imageUrl"]
            .as_str()
            .unwrap()
            .contains("/media/screenshots/")
    );
    assert!(body["data"]["analysis"]["tags"].as_array().unwrap().len() >= 5);

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].owner_id, "user-7");
}

#[tokio::test]
async fn process_screenshot_without_user_id_is_rejected() {
    let (store, server) = test_server(CannedVision::json());

    let res = server
        .post("/process-screenshot")
        .multipart(screenshot_form(None))
        .await;

    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "User ID is required");
    assert!(store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn process_screenshot_without_file_is_rejected() {
    let (_store, server) = test_server(CannedVision::json());

    let res = server
        .post("/process-screenshot")
        .multipart(MultipartForm::new().add_text("userId", "user-7"))
        .await;

    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn unparsable_analysis_maps_to_500_with_distinct_error() {
    let (store, server) = test_server(CannedVision::prose());

    let res = server
        .post("/process-screenshot")
        .multipart(screenshot_form(Some("user-7")))
        .await;

    res.assert_status_internal_server_error();
    let body: Value = res.json();
    assert_eq!(body["error"], "AI response unparsable");
    assert!(store.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn search_requires_query_and_user_id() {
    let (_store, server) = test_server(CannedVision::json());

    let res = server.post("/search").json(&json!({ "query": "cats" })).await;
    res.assert_status_bad_request();
    let body: Value = res.json();
    assert_eq!(body["error"], "Query and User ID are required");

    let res = server
        .post("/search")
        .json(&json!({ "query": "", "userId": "user-7" }))
        .await;
    res.assert_status_bad_request();
}

#[tokio::test]
async fn search_returns_only_this_owners_ranked_results() {
    let (store, server) = test_server(CannedVision::json());

    // Stored query-identical vectors so every seeded record clears the
    // floor; a foreign owner holds a perfect match that must not leak.
    let embedder = FakeEmbedder { dimension: 768 };
    let query_vec = {
        use recall::ai::Embedder as _;
        embedder.embed("login page").await.unwrap()
    };
    store.seed("user-7", "mine-1", query_vec.clone());
    store.seed("user-7", "mine-2", query_vec.clone());
    store.seed("someone-else", "theirs", query_vec);

    let res = server
        .post("/search")
        .json(&json!({ "query": "login page", "userId": "user-7" }))
        .await;

    res.assert_status_ok();
    let body: Value = res.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for r in results {
        assert_eq!(r["ownerId"], "user-7");
        assert!(r["similarity"].as_f64().unwrap() >= 0.5);
    }
}
