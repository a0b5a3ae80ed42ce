//! End-to-end test: a real listener on an ephemeral port, driven over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use noteful_server::{AppState, ServerConfig, build_app};
use noteful_store::MemoryStore;
use reqwest::{StatusCode, header};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "roundtrip-token";

async fn spawn_server() -> SocketAddr {
    let state = AppState::new(Arc::new(MemoryStore::new()), ServerConfig::new(TOKEN));
    let app = build_app(state).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_bookmark_lifecycle_over_http() {
    let addr = spawn_server().await;
    let base = format!("http://{addr}/api/bookmarks");
    let client = reqwest::Client::new();

    // Create
    let response = client
        .post(&base)
        .bearer_auth(TOKEN)
        .json(&json!({
            "title": "Docs <script>x()</script>",
            "url": "https://docs.rs",
            "description": "<em>crate docs</em>",
            "rating": "4"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string();
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/bookmarks/{id}"));
    assert_eq!(created["title"], json!("Docs &lt;script&gt;x()&lt;/script&gt;"));
    assert_eq!(created["description"], json!("<em>crate docs</em>"));

    // Update
    let item = format!("http://{addr}{location}");
    let response = client
        .patch(&item)
        .bearer_auth(TOKEN)
        .json(&json!({ "rating": "5", "ignored": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Read
    let fetched: Value = client
        .get(&item)
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["rating"], json!("5"));
    assert_eq!(fetched["url"], json!("https://docs.rs"));

    // Delete
    let response = client.delete(&item).bearer_auth(TOKEN).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get(&item).bearer_auth(TOKEN).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": { "message": "Bookmark doesn't exist" } }));
}

#[tokio::test]
async fn test_requests_without_token_are_rejected_over_http() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/api/notes"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": { "message": "Unauthorized request" } }));
}
