//! API integration tests
//!
//! These run against a live server seeded with `cargo run --bin seed`
//! (staff accounts `librarian@maktaba.org` / `admin@maktaba.org`).

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and return a bearer token
async fn get_token(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn librarian_token(client: &Client) -> String {
    get_token(client, "librarian@maktaba.org", "librarian").await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test Reader",
            "email": "test.reader@example.org",
            "password": "reading-is-fun"
        }))
        .send()
        .await
        .expect("Failed to send request");

    // 201 on first run, 409 when the account already exists
    assert!(response.status() == 201 || response.status() == 409);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "test.reader@example.org",
            "password": "reading-is-fun"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["role"], "reader");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "librarian@maktaba.org",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_reader_cannot_use_librarian_endpoints() {
    let client = Client::new();
    let token = get_token(&client, "test.reader@example.org", "reading-is-fun").await;

    let response = client
        .get(format!("{}/librarian/inventory", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();
    let token = librarian_token(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_create_and_delete_book() {
    let client = Client::new();
    let token = librarian_token(&client).await;

    // Create book
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Test Book",
            "author": "Test Author",
            "isbn": "978-0-00-000000-0",
            "total_copies": 2
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let book_id = body["id"].as_i64().expect("No book ID");
    assert_eq!(body["available_copies"], 2);

    // Delete book
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_borrow_request_lifecycle() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;
    let reader = get_token(&client, "test.reader@example.org", "reading-is-fun").await;

    // Librarian adds a book with one copy
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({
            "title": "Lifecycle Book",
            "author": "Cycle Author",
            "isbn": "978-0-00-000001-7",
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().unwrap();

    // Reader submits a request
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let request: Value = response.json().await.expect("Failed to parse response");
    let request_id = request["id"].as_i64().unwrap();
    assert_eq!(request["status"], "pending");

    // A second request for the same book is a duplicate
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", reader))
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Librarian approves; the only copy leaves the shelf
    let response = client
        .post(format!("{}/librarian/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["request"]["status"], "approved");
    assert!(body["request"]["due_date"].is_string());

    // A second approval must fail: the request is no longer pending
    let response = client
        .post(format!("{}/librarian/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // Book is now out of stock
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["available_copies"], 0);

    // Return restores the copy
    let response = client
        .post(format!("{}/librarian/requests/{}/return", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", librarian))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["available_copies"], 1);

    // Cleanup is not possible while logs reference the book; leave it in place
}

#[tokio::test]
#[ignore]
async fn test_reject_requires_reason() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;

    let response = client
        .post(format!("{}/librarian/requests/999999/reject", BASE_URL))
        .header("Authorization", format!("Bearer {}", librarian))
        .json(&json!({ "reason": "" }))
        .send()
        .await
        .expect("Failed to send request");

    // Validation fires before the request lookup
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_get_inventory() {
    let client = Client::new();
    let token = librarian_token(&client).await;

    let response = client
        .get(format!("{}/librarian/inventory", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["summary"]["total_copies"].is_number());

    // borrowed + available always adds up to the total
    let summary = &body["summary"];
    assert_eq!(
        summary["available_copies"].as_i64().unwrap() + summary["borrowed_copies"].as_i64().unwrap(),
        summary["total_copies"].as_i64().unwrap()
    );
}

#[tokio::test]
#[ignore]
async fn test_get_stats() {
    let client = Client::new();
    let token = get_token(&client, "admin@maktaba.org", "admin").await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"]["titles"].is_number());
    assert!(body["users"]["total"].is_number());
    assert!(body["requests"]["pending"].is_number());
}
