//! API integration tests
//!
//! These run against a live server backed by PostgreSQL with the default
//! configuration (admin referral code "1234", borrowing limit 3).

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";
const ADMIN_REFERRAL: &str = "1234";

fn unique_email(prefix: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .expect("Timestamp out of range");
    format!("{}-{}@example.com", prefix, nanos)
}

/// Read the user id from a session token without checking its signature
fn user_id_from_token(token: &str) -> i64 {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    let claims = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)
        .expect("Malformed token")
        .claims;
    claims["user_id"].as_i64().expect("No user_id claim")
}

/// Register a fresh account and return its token and user id
async fn register(client: &Client, prefix: &str, referal: Option<&str>) -> (String, i64) {
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "firstname": "Test",
            "lastname": prefix,
            "email": unique_email(prefix),
            "password": "secret",
            "referal": referal
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse register response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = user_id_from_token(&token);
    (token, user_id)
}

/// Create a book as admin and return its id
async fn create_book(client: &Client, admin_token: &str, quantity: i32) -> i64 {
    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "title": "Integration Book",
            "author": "Tester",
            "publishedAt": "2001-01-01",
            "availableQuantity": quantity
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No book id")
}

async fn available_quantity(client: &Client, book_id: i64) -> i64 {
    let body: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse book");
    body["availableQuantity"].as_i64().expect("No quantity")
}

async fn borrow(client: &Client, token: &str, user_id: i64, book_ids: &[i64]) -> reqwest::Response {
    client
        .post(format!("{}/myaccount/users/{}/borrow", BASE_URL, user_id))
        .bearer_auth(token)
        .json(&json!({ "book_ids": book_ids }))
        .send()
        .await
        .expect("Failed to send borrow request")
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_non_admin_cannot_create_book() {
    let client = Client::new();
    let (token, _) = register(&client, "reader", None).await;

    let response = client
        .post(format!("{}/admin/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "T",
            "author": "A",
            "publishedAt": "2001-01-01",
            "availableQuantity": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_last_copy_goes_to_first_borrower() {
    let client = Client::new();
    let (admin, _) = register(&client, "admin", Some(ADMIN_REFERRAL)).await;
    let book_id = create_book(&client, &admin, 1).await;

    let (alice, alice_id) = register(&client, "alice", None).await;
    let (bob, bob_id) = register(&client, "bob", None).await;

    let response = borrow(&client, &alice, alice_id, &[book_id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = borrow(&client, &bob, bob_id, &[book_id]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["message"], "Book not available");

    assert_eq!(available_quantity(&client, book_id).await, 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_is_enforced() {
    let client = Client::new();
    let (admin, _) = register(&client, "admin", Some(ADMIN_REFERRAL)).await;
    let book_id = create_book(&client, &admin, 10).await;
    let (token, user_id) = register(&client, "greedy", None).await;

    let response = borrow(&client, &token, user_id, &[book_id, book_id, book_id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = borrow(&client, &token, user_id, &[book_id]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["message"], "Exceeded borrowing limit");

    assert_eq!(available_quantity(&client, book_id).await, 7);
}

#[tokio::test]
#[ignore]
async fn test_return_restores_stock() {
    let client = Client::new();
    let (admin, _) = register(&client, "admin", Some(ADMIN_REFERRAL)).await;
    let book_id = create_book(&client, &admin, 2).await;
    let (token, user_id) = register(&client, "returner", None).await;

    let response = borrow(&client, &token, user_id, &[book_id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(available_quantity(&client, book_id).await, 1);

    let response = client
        .post(format!("{}/myaccount/users/{}/return", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({ "book_ids": [book_id] }))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["returned"], 1);

    assert_eq!(available_quantity(&client, book_id).await, 2);
}

#[tokio::test]
#[ignore]
async fn test_delete_account_returns_books() {
    let client = Client::new();
    let (admin, _) = register(&client, "admin", Some(ADMIN_REFERRAL)).await;
    let book_id = create_book(&client, &admin, 2).await;

    let email = unique_email("leaver");
    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "firstname": "Test",
            "lastname": "Leaver",
            "email": email,
            "password": "secret"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token").to_string();
    let user_id = user_id_from_token(&token);

    let response = borrow(&client, &token, user_id, &[book_id, book_id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(available_quantity(&client, book_id).await, 0);

    let response = client
        .delete(format!("{}/myaccount/users/{}/delete", BASE_URL, user_id))
        .bearer_auth(&token)
        .json(&json!({ "password": "secret" }))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(available_quantity(&client, book_id).await, 2);

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
