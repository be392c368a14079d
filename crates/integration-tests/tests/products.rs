//! Integration tests for product CRUD, ownership, and listing.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p tradepost-api)
//!
//! Run with: cargo test -p tradepost-integration-tests -- --ignored

use serde_json::{Value, json};

use tradepost_integration_tests::{api_base_url, create_product, session_client, signup};

// ============================================================================
// CRUD Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_and_fetch_product() {
    let client = session_client();
    let base_url = api_base_url();

    let (_, username) = signup(&client, "pass-word-1").await;
    let product_id = create_product(&client, "Telescope", 129.5).await;

    // Public fetch, no auth needed
    let resp = session_client()
        .get(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["product"]["title"], "Telescope");
    assert_eq!(body["product"]["seller"]["username"], username.as_str());
    assert!((body["product"]["price"].as_f64().expect("price") - 129.5).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_product_requires_auth() {
    let resp = session_client()
        .post(format!("{}/products", api_base_url()))
        .json(&json!({
            "title": "Ghost Listing",
            "description": "No session attached",
            "category": "Other",
            "price": 1,
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_create_product_validation() {
    let client = session_client();
    let base_url = api_base_url();
    signup(&client, "pass-word-1").await;

    // Empty title
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({ "title": "", "description": "d", "category": "Other", "price": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status().as_u16(), 400);

    // Unknown category
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({ "title": "t", "description": "d", "category": "Vehicles", "price": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status().as_u16(), 400);

    // Negative price
    let resp = client
        .post(format!("{base_url}/products"))
        .json(&json!({ "title": "t", "description": "d", "category": "Other", "price": -1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_update_and_delete_own_product() {
    let client = session_client();
    let base_url = api_base_url();

    signup(&client, "pass-word-1").await;
    let product_id = create_product(&client, "Old Title", 10.0).await;

    let resp = client
        .put(format!("{base_url}/products/{product_id}"))
        .json(&json!({ "title": "New Title", "price": 12.5 }))
        .send()
        .await
        .expect("Failed to update product");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["product"]["title"], "New Title");

    let resp = client
        .delete(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = session_client()
        .get(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status().as_u16(), 404);
}

// ============================================================================
// Ownership Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_foreign_product_mutation_is_forbidden() {
    let base_url = api_base_url();

    let seller = session_client();
    signup(&seller, "pass-word-1").await;
    let product_id = create_product(&seller, "Seller's Chair", 40.0).await;

    let intruder = session_client();
    signup(&intruder, "pass-word-1").await;

    // A perfectly valid update body still gets 403 from a non-owner
    let resp = intruder
        .put(format!("{base_url}/products/{product_id}"))
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .expect("Failed to send update");
    assert_eq!(resp.status().as_u16(), 403);

    let resp = intruder
        .delete(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(resp.status().as_u16(), 403);

    // The product is untouched
    let resp = session_client()
        .get(format!("{base_url}/products/{product_id}"))
        .send()
        .await
        .expect("Failed to fetch product");
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["product"]["title"], "Seller's Chair");
}

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_listing_pagination_shape() {
    let base_url = api_base_url();

    let resp = session_client()
        .get(format!("{base_url}/products?page=1&limit=5"))
        .send()
        .await
        .expect("Failed to list products");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert!(body["products"].is_array());
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 5);
    assert!(body["pagination"]["total"].is_number());
    assert!(body["pagination"]["pages"].is_number());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_search_finds_created_product() {
    let client = session_client();
    let base_url = api_base_url();

    signup(&client, "pass-word-1").await;
    // Unique marker so search is not polluted by other test data
    let marker = tradepost_integration_tests::unique_username();
    let title = format!("Sextant {marker}");
    create_product(&client, &title, 75.0).await;

    let resp = session_client()
        .get(format!("{base_url}/products?search={marker}"))
        .send()
        .await
        .expect("Failed to search products");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    let products = body["products"].as_array().expect("products array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["title"], title.as_str());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_own_listings_endpoint() {
    let client = session_client();
    let base_url = api_base_url();

    signup(&client, "pass-word-1").await;
    create_product(&client, "Mine A", 1.0).await;
    create_product(&client, "Mine B", 2.0).await;

    let resp = client
        .get(format!("{base_url}/products/user"))
        .send()
        .await
        .expect("Failed to list own products");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    let products = body["products"].as_array().expect("products array");
    assert_eq!(products.len(), 2);
    // Newest first
    assert_eq!(products[0]["title"], "Mine B");
    assert_eq!(products[1]["title"], "Mine A");
}
