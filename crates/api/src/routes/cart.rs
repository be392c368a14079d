//! Cart route handlers.
//!
//! All cart routes are scoped to the authenticated user; there is no way to
//! address another user's cart.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use tradepost_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::CartService;
use crate::state::AppState;

// =============================================================================
// Request & Response Types
// =============================================================================

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// Remove-from-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: ProductId,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Response wrapping the cart view.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: CartView,
}

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// The current user's cart: valid items plus the total at current prices.
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn show(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartResponse>> {
    let cart = CartService::new(state.pool()).read(current.user_id).await?;

    Ok(Json(CartResponse { cart }))
}

/// Add a product to the cart. Quantity defaults to 1; adding a product
/// already in the cart merges quantities.
///
/// # Errors
///
/// Returns 404 if the product is absent, 400 for a self-purchase or an
/// invalid quantity.
pub async fn add(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddRequest>,
) -> Result<Json<MessageResponse>> {
    let quantity = body.quantity.unwrap_or(1);

    CartService::new(state.pool())
        .add(current.user_id, body.product_id, quantity)
        .await?;

    Ok(Json(MessageResponse {
        message: "Product added to cart successfully",
    }))
}

/// Remove a product from the cart. Removing an item that is not present is
/// a no-op success.
///
/// # Errors
///
/// Returns 404 if the user has no cart.
pub async fn remove(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<RemoveRequest>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool())
        .remove(current.user_id, body.product_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Product removed from cart successfully",
    }))
}

/// Set the quantity of a product already in the cart.
///
/// # Errors
///
/// Returns 404 if the cart or item is absent, 400 for an invalid quantity.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateRequest>,
) -> Result<Json<MessageResponse>> {
    CartService::new(state.pool())
        .set_quantity(current.user_id, body.product_id, body.quantity)
        .await?;

    Ok(Json(MessageResponse {
        message: "Cart updated successfully",
    }))
}
