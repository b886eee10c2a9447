//! Integration tests for the SnippetBox HTTP API.

mod support;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use support::{as_user, setup_test_server};

async fn create_tag(server: &TestServer, user: &str, name: &str) -> String {
    let response = as_user(server.post("/api/tags"), user)
        .json(&json!({ "name": name, "color": "#336699" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let tag: Value = response.json();
    tag["id"].as_str().expect("tag id").to_string()
}

async fn create_snippet(server: &TestServer, user: &str, body: Value) -> Value {
    let response = as_user(server.post("/api/snippets"), user).json(&body).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

fn snippet_body(title: &str, language: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "description": format!("{title} description"),
        "code": "print('hello')",
        "programming_language": language,
        "tags": tags,
    })
}

async fn tag_count(server: &TestServer, user: &str, id: &str) -> u64 {
    let response = as_user(server.get(&format!("/api/tags/{}", id)), user).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let tag: Value = response.json();
    tag["snippet_count"].as_u64().expect("count")
}

#[tokio::test]
async fn test_snippet_lifecycle() {
    let (server, _temp) = setup_test_server();

    let snippet = create_snippet(&server, "alice", snippet_body("Hello", "python", &[])).await;
    let id = snippet["id"].as_str().expect("id");
    assert_eq!(snippet["user_id"], "alice");
    assert_eq!(snippet["programming_language"], "python");
    assert_eq!(snippet["is_public"], true);

    let fetched = as_user(server.get(&format!("/api/snippets/{}", id)), "alice").await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    let fetched: Value = fetched.json();
    assert_eq!(fetched["title"], "Hello");

    let updated = as_user(server.put(&format!("/api/snippets/{}", id)), "alice")
        .json(&json!({ "title": "Hello again", "code": "print('bye')" }))
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated: Value = updated.json();
    assert_eq!(updated["title"], "Hello again");
    assert_eq!(updated["description"], "Hello description");

    let deleted = as_user(server.delete(&format!("/api/snippets/{}", id)), "alice").await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let body: Value = deleted.json();
    assert_eq!(body["success"], true);

    let gone = as_user(server.get(&format!("/api/snippets/{}", id)), "alice").await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
    let body: Value = gone.json();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let (server, _temp) = setup_test_server();

    let response = server.get("/api/snippets").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some());

    let blank = as_user(server.get("/api/tags"), "   ").await;
    assert_eq!(blank.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_users_cannot_read_or_mutate_snippets() {
    let (server, _temp) = setup_test_server();
    let snippet = create_snippet(&server, "alice", snippet_body("Private", "rust", &[])).await;
    let path = format!("/api/snippets/{}", snippet["id"].as_str().expect("id"));

    let read = as_user(server.get(&path), "mallory").await;
    assert_eq!(read.status_code(), StatusCode::FORBIDDEN);
    let update = as_user(server.put(&path), "mallory")
        .json(&json!({ "title": "pwned" }))
        .await;
    assert_eq!(update.status_code(), StatusCode::FORBIDDEN);
    let delete = as_user(server.delete(&path), "mallory").await;
    assert_eq!(delete.status_code(), StatusCode::FORBIDDEN);

    let listing = as_user(server.get("/api/snippets"), "mallory").await;
    let page: Value = listing.json();
    assert_eq!(page["total_count"], 0);

    let still_there: Value = as_user(server.get(&path), "alice").await.json();
    assert_eq!(still_there["title"], "Private");
}

#[tokio::test]
async fn test_list_filters_sort_and_paginate() {
    let (server, _temp) = setup_test_server();
    let algo = create_tag(&server, "alice", "algo").await;
    let tagged = [algo.as_str()];
    create_snippet(&server, "alice", snippet_body("Quick sort", "rust", &tagged)).await;
    create_snippet(&server, "alice", snippet_body("Merge sort", "python", &tagged)).await;
    create_snippet(&server, "alice", snippet_body("HTTP client", "rust", &[])).await;

    let filtered = as_user(server.get("/api/snippets"), "alice")
        .add_query_param("search", "SORT")
        .add_query_param("language", "rust")
        .add_query_param("tag", &algo)
        .await;
    assert_eq!(filtered.status_code(), StatusCode::OK);
    let page: Value = filtered.json();
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["title"], "Quick sort");

    let sorted = as_user(server.get("/api/snippets"), "alice")
        .add_query_param("sortBy", "title")
        .add_query_param("sortDirection", "asc")
        .add_query_param("limit", "2")
        .add_query_param("page", "2")
        .await;
    let page: Value = sorted.json();
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["items"].as_array().expect("items").len(), 1);
    assert_eq!(page["items"][0]["title"], "Quick sort");

    let clamped = as_user(server.get("/api/snippets"), "alice")
        .add_query_param("limit", "1000")
        .await;
    let page: Value = clamped.json();
    assert_eq!(page["limit"], 100);
    assert_eq!(page["total_pages"], 1);
}

#[tokio::test]
async fn test_list_rejects_invalid_parameters() {
    let (server, _temp) = setup_test_server();
    for (key, value) in [
        ("page", "0"),
        ("limit", "0"),
        ("sortBy", "code"),
        ("sortDirection", "sideways"),
        ("language", "klingon"),
    ] {
        let response = as_user(server.get("/api/snippets"), "alice")
            .add_query_param(key, value)
            .await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "{key}={value} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_tag_counts_follow_snippet_changes() {
    let (server, _temp) = setup_test_server();
    let a = create_tag(&server, "alice", "a").await;
    let b = create_tag(&server, "alice", "b").await;
    let c = create_tag(&server, "alice", "c").await;

    let initial = [a.as_str(), a.as_str(), b.as_str()];
    let snippet = create_snippet(&server, "alice", snippet_body("Tagged", "go", &initial)).await;
    let path = format!("/api/snippets/{}", snippet["id"].as_str().expect("id"));
    assert_eq!(tag_count(&server, "alice", &a).await, 1);
    assert_eq!(tag_count(&server, "alice", &b).await, 1);

    let response = as_user(server.put(&path), "alice")
        .json(&json!({ "tags": [&b, &c] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(tag_count(&server, "alice", &a).await, 0);
    assert_eq!(tag_count(&server, "alice", &b).await, 1);
    assert_eq!(tag_count(&server, "alice", &c).await, 1);

    let response = as_user(server.delete(&path), "alice").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(tag_count(&server, "alice", &b).await, 0);
    assert_eq!(tag_count(&server, "alice", &c).await, 0);
}

#[tokio::test]
async fn test_tag_crud_and_conflicts() {
    let (server, _temp) = setup_test_server();
    let id = create_tag(&server, "alice", "backend").await;

    let duplicate = as_user(server.post("/api/tags"), "alice")
        .json(&json!({ "name": "Backend", "color": "#fff" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let invalid = as_user(server.post("/api/tags"), "alice")
        .json(&json!({ "name": "", "color": "blue" }))
        .await;
    assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = invalid.json();
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("Tag name is required"), "{message}");
    assert!(message.contains("valid hex color"), "{message}");

    create_tag(&server, "bob", "backend").await;

    let renamed = as_user(server.put(&format!("/api/tags/{}", id)), "alice")
        .json(&json!({ "color": "#000000" }))
        .await;
    assert_eq!(renamed.status_code(), StatusCode::OK);
    let renamed: Value = renamed.json();
    assert_eq!(renamed["color"], "#000000");
    assert_eq!(renamed["name"], "backend");

    let listing: Value = as_user(server.get("/api/tags"), "alice").await.json();
    assert_eq!(listing.as_array().expect("tags").len(), 1);

    let foreign = as_user(server.delete(&format!("/api/tags/{}", id)), "bob").await;
    assert_eq!(foreign.status_code(), StatusCode::FORBIDDEN);
    let deleted = as_user(server.delete(&format!("/api/tags/{}", id)), "alice").await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_snippet_validation_errors() {
    let (server, _temp) = setup_test_server();

    let missing = as_user(server.post("/api/snippets"), "alice")
        .json(&json!({
            "title": "  ",
            "description": "",
            "code": "",
            "programming_language": "rust"
        }))
        .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = missing.json();
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("Title is required"), "{message}");
    assert!(message.contains("Code is required"), "{message}");

    let oversized = as_user(server.post("/api/snippets"), "alice")
        .json(&json!({
            "title": "Big",
            "description": "too large",
            "code": "x".repeat(5000),
            "programming_language": "rust"
        }))
        .await;
    assert_eq!(oversized.status_code(), StatusCode::BAD_REQUEST);

    let unknown_language = as_user(server.post("/api/snippets"), "alice")
        .json(&json!({
            "title": "Odd",
            "description": "odd language",
            "code": "??",
            "programming_language": "brainfreeze"
        }))
        .await;
    assert_eq!(unknown_language.status_code(), StatusCode::BAD_REQUEST);

    let snippet = create_snippet(&server, "alice", snippet_body("Kept", "rust", &[])).await;
    let path = format!("/api/snippets/{}", snippet["id"].as_str().expect("id"));
    let blanked = as_user(server.put(&path), "alice")
        .json(&json!({ "description": "   " }))
        .await;
    assert_eq!(blanked.status_code(), StatusCode::BAD_REQUEST);
    let stored: Value = as_user(server.get(&path), "alice").await.json();
    assert_eq!(stored["description"], "Kept description");
}

#[tokio::test]
async fn test_public_listing_needs_no_identity() {
    let (server, _temp) = setup_test_server();
    create_snippet(&server, "alice", snippet_body("Shared", "rust", &[])).await;
    let mut private = snippet_body("Hidden", "rust", &[]);
    private["is_public"] = json!(false);
    create_snippet(&server, "alice", private).await;

    let response = server.get("/api/users/alice/snippets/public").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let items: Value = response.json();
    let titles: Vec<&str> = items
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Shared"]);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (server, _temp) = setup_test_server();
    let response = as_user(server.get("/api/snippets"), "alice").await;
    response.assert_header("x-content-type-options", "nosniff");
    response.assert_header("x-frame-options", "DENY");
}
