//! Integration tests for the cart aggregate and the checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p tradepost-api)
//!
//! Run with: cargo test -p tradepost-integration-tests -- --ignored

use reqwest::Client;
use serde_json::{Value, json};

use tradepost_integration_tests::{api_base_url, create_product, session_client, signup};

/// Seller with one product, plus a separate buyer session.
async fn seller_product_and_buyer(title: &str, price: f64) -> (Client, i64, Client) {
    let seller = session_client();
    signup(&seller, "pass-word-1").await;
    let product_id = create_product(&seller, title, price).await;

    let buyer = session_client();
    signup(&buyer, "pass-word-1").await;

    (seller, product_id, buyer)
}

async fn add_to_cart(client: &Client, product_id: i64, quantity: i64) -> u16 {
    client
        .post(format!("{}/cart/add", api_base_url()))
        .json(&json!({ "productId": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add to cart")
        .status()
        .as_u16()
}

async fn get_cart(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/cart", api_base_url()))
        .send()
        .await
        .expect("Failed to get cart");
    assert_eq!(resp.status().as_u16(), 200);
    resp.json().await.expect("Failed to parse cart body")
}

// ============================================================================
// Cart Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_absent_cart_reads_as_empty() {
    let client = session_client();
    signup(&client, "pass-word-1").await;

    let body = get_cart(&client).await;
    assert_eq!(body["cart"]["products"].as_array().expect("array").len(), 0);
    assert!((body["cart"]["totalAmount"].as_f64().expect("total")).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_merges_quantities() {
    let (_seller, product_id, buyer) = seller_product_and_buyer("Kettle", 15.0).await;

    // Add(A, 1) then Add(A, 2) yields one line with quantity 3
    assert_eq!(add_to_cart(&buyer, product_id, 1).await, 200);
    assert_eq!(add_to_cart(&buyer, product_id, 2).await, 200);

    let body = get_cart(&buyer).await;
    let products = body["cart"]["products"].as_array().expect("array");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["quantity"], 3);
    assert!((body["cart"]["totalAmount"].as_f64().expect("total") - 45.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cannot_add_own_product() {
    let seller = session_client();
    signup(&seller, "pass-word-1").await;
    let product_id = create_product(&seller, "My Own Rug", 20.0).await;

    assert_eq!(add_to_cart(&seller, product_id, 1).await, 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_add_unknown_product_is_not_found() {
    let client = session_client();
    signup(&client, "pass-word-1").await;

    assert_eq!(add_to_cart(&client, 999_999_999, 1).await, 404);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_remove_absent_item_is_noop() {
    let (_seller, product_id, buyer) = seller_product_and_buyer("Mirror", 9.0).await;

    // Create the cart by adding something
    assert_eq!(add_to_cart(&buyer, product_id, 1).await, 200);

    // Removing a product that is not in the cart succeeds
    let resp = buyer
        .post(format!("{}/cart/remove", api_base_url()))
        .json(&json!({ "productId": 999_999_999 }))
        .send()
        .await
        .expect("Failed to remove");
    assert_eq!(resp.status().as_u16(), 200);

    // And removing it again also succeeds (idempotent)
    let resp = buyer
        .post(format!("{}/cart/remove", api_base_url()))
        .json(&json!({ "productId": 999_999_999 }))
        .send()
        .await
        .expect("Failed to remove");
    assert_eq!(resp.status().as_u16(), 200);

    // The real item is still there
    let body = get_cart(&buyer).await;
    assert_eq!(body["cart"]["products"].as_array().expect("array").len(), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_set_quantity_of_missing_item_is_not_found() {
    let (_seller, product_id, buyer) = seller_product_and_buyer("Vase", 9.0).await;
    assert_eq!(add_to_cart(&buyer, product_id, 1).await, 200);

    let resp = buyer
        .post(format!("{}/cart/update", api_base_url()))
        .json(&json!({ "productId": 999_999_999, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to update");
    assert_eq!(resp.status().as_u16(), 404);

    // Updating the present item works
    let resp = buyer
        .post(format!("{}/cart/update", api_base_url()))
        .json(&json!({ "productId": product_id, "quantity": 4 }))
        .send()
        .await
        .expect("Failed to update");
    assert_eq!(resp.status().as_u16(), 200);

    let body = get_cart(&buyer).await;
    assert_eq!(body["cart"]["products"][0]["quantity"], 4);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_deleted_product_is_filtered_from_cart_view() {
    let (seller, product_id, buyer) = seller_product_and_buyer("Fleeting Lamp", 30.0).await;
    assert_eq!(add_to_cart(&buyer, product_id, 2).await, 200);

    let resp = seller
        .delete(format!("{}/products/{product_id}", api_base_url()))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status().as_u16(), 200);

    // The dangling line disappears from the view and the total
    let body = get_cart(&buyer).await;
    assert_eq!(body["cart"]["products"].as_array().expect("array").len(), 0);
    assert!((body["cart"]["totalAmount"].as_f64().expect("total")).abs() < f64::EPSILON);
}

// ============================================================================
// Checkout Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_totals_and_clears_cart() {
    let seller = session_client();
    signup(&seller, "pass-word-1").await;
    let product_a = create_product(&seller, "Product A", 10.0).await;
    let product_b = create_product(&seller, "Product B", 5.0).await;

    let buyer = session_client();
    signup(&buyer, "pass-word-1").await;

    // Cart of {A x2, B x1} totals 25
    assert_eq!(add_to_cart(&buyer, product_a, 2).await, 200);
    assert_eq!(add_to_cart(&buyer, product_b, 1).await, 200);

    let resp = buyer
        .post(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status().as_u16(), 201);

    let body: Value = resp.json().await.expect("Failed to parse checkout body");
    assert!(
        (body["purchase"]["totalAmount"].as_f64().expect("total") - 25.0).abs() < f64::EPSILON
    );
    assert_eq!(
        body["purchase"]["products"].as_array().expect("array").len(),
        2
    );

    // Cart is emptied, not deleted: reads back as zero items
    let cart = get_cart(&buyer).await;
    assert_eq!(cart["cart"]["products"].as_array().expect("array").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_empty_cart_is_rejected() {
    let buyer = session_client();
    signup(&buyer, "pass-word-1").await;

    let resp = buyer
        .post(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status().as_u16(), 400);

    // No purchase was recorded
    let resp = buyer
        .get(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to get purchases");
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["purchases"].as_array().expect("array").len(), 0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_checkout_all_dangling_cart_is_rejected() {
    let (seller, product_id, buyer) = seller_product_and_buyer("Vanishing Chair", 12.0).await;
    assert_eq!(add_to_cart(&buyer, product_id, 1).await, 200);

    let resp = seller
        .delete(format!("{}/products/{product_id}", api_base_url()))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status().as_u16(), 200);

    let resp = buyer
        .post(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_purchase_snapshot_survives_product_deletion() {
    let (seller, product_id, buyer) = seller_product_and_buyer("Heirloom Clock", 80.0).await;

    assert_eq!(add_to_cart(&buyer, product_id, 1).await, 200);
    let resp = buyer
        .post(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status().as_u16(), 201);

    // Seller deletes the product after the sale
    let resp = seller
        .delete(format!("{}/products/{product_id}", api_base_url()))
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status().as_u16(), 200);

    // The purchase still shows the snapshot title and price; the live
    // product enrichment is null
    let resp = buyer
        .get(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to get purchases");
    let body: Value = resp.json().await.expect("Failed to parse body");

    let purchases = body["purchases"].as_array().expect("array");
    assert_eq!(purchases.len(), 1);
    let item = &purchases[0]["products"][0];
    assert_eq!(item["title"], "Heirloom Clock");
    assert!((item["price"].as_f64().expect("price") - 80.0).abs() < f64::EPSILON);
    assert!(item["product"].is_null());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_dashboard_stats_reflect_activity() {
    let seller = session_client();
    signup(&seller, "pass-word-1").await;
    let product_id = create_product(&seller, "Stats Widget", 10.0).await;

    let buyer = session_client();
    signup(&buyer, "pass-word-1").await;
    assert_eq!(add_to_cart(&buyer, product_id, 2).await, 200);

    let resp = buyer
        .post(format!("{}/purchases", api_base_url()))
        .send()
        .await
        .expect("Failed to checkout");
    assert_eq!(resp.status().as_u16(), 201);

    let resp = buyer
        .get(format!("{}/dashboard/stats", api_base_url()))
        .send()
        .await
        .expect("Failed to get stats");
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["stats"]["listingsCount"], 0);
    assert_eq!(body["stats"]["purchasesCount"], 1);
    assert!((body["stats"]["totalSpent"].as_f64().expect("total") - 20.0).abs() < f64::EPSILON);
    assert_eq!(body["recentPurchases"].as_array().expect("array").len(), 1);

    // The seller's side counts the listing
    let resp = seller
        .get(format!("{}/dashboard/stats", api_base_url()))
        .send()
        .await
        .expect("Failed to get stats");
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert_eq!(body["stats"]["listingsCount"], 1);
    assert_eq!(body["recentListings"].as_array().expect("array").len(), 1);
}
