//! Shared helpers for Tradepost integration tests.
//!
//! The tests in `tests/` drive a running API server over HTTP. They require:
//! - A running `PostgreSQL` database with migrations applied
//!   (`cargo run -p tradepost-cli -- migrate`)
//! - The API server running (`cargo run -p tradepost-api`)
//!
//! Each test creates its own users with uuid-suffixed emails/usernames so
//! runs are isolated and repeatable against the same database.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("TRADEPOST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client with a cookie store, so the session cookie set at
/// signup/login is sent on subsequent requests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique, valid username (well under the 20-character limit).
#[must_use]
pub fn unique_username() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("u{}", suffix.get(..12).unwrap_or("testuser"))
}

/// A unique email address.
#[must_use]
pub fn unique_email() -> String {
    format!("{}@test.tradepost.dev", Uuid::new_v4().simple())
}

/// Sign up a fresh user on the given client and return (email, username).
/// The client's cookie store holds the session afterwards.
///
/// # Panics
///
/// Panics if the signup request fails or is rejected.
pub async fn signup(client: &Client, password: &str) -> (String, String) {
    let email = unique_email();
    let username = unique_username();

    let resp = client
        .post(format!("{}/auth/signup", api_base_url()))
        .json(&json!({
            "email": email,
            "username": username,
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(resp.status().as_u16(), 201, "signup should succeed");

    (email, username)
}

/// Create a product as the client's current user and return its ID.
///
/// # Panics
///
/// Panics if the create request fails or is rejected.
pub async fn create_product(client: &Client, title: &str, price: f64) -> i64 {
    let resp = client
        .post(format!("{}/products", api_base_url()))
        .json(&json!({
            "title": title,
            "description": "Integration test product",
            "category": "Other",
            "price": price,
        }))
        .send()
        .await
        .expect("Failed to send create-product request");

    assert_eq!(resp.status().as_u16(), 201, "product create should succeed");

    let body: Value = resp.json().await.expect("Failed to parse product body");
    body["product"]["id"]
        .as_i64()
        .expect("product id should be a number")
}
