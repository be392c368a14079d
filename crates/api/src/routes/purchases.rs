//! Purchase route handlers.
//!
//! GET returns the history; POST performs checkout.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::PurchaseView;
use crate::services::CheckoutService;
use crate::state::AppState;

/// Response wrapping the purchase history.
#[derive(Debug, Serialize)]
pub struct PurchasesResponse {
    pub purchases: Vec<PurchaseView>,
}

/// Response for a completed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub purchase: PurchaseView,
}

/// The current user's purchase history, newest first.
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn history(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<PurchasesResponse>> {
    let purchases = CheckoutService::new(state.pool())
        .history(current.user_id)
        .await?;

    Ok(Json(PurchasesResponse { purchases }))
}

/// Check out the current user's cart.
///
/// Snapshots title and price from current product state into an immutable
/// purchase record and empties the cart.
///
/// # Errors
///
/// Returns 400 if the cart is empty or holds only dangling references.
pub async fn checkout(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let purchase = CheckoutService::new(state.pool())
        .checkout(current.user_id)
        .await?;

    tracing::info!(
        user_id = %current.user_id,
        purchase_id = %purchase.id,
        total = %purchase.total_amount,
        "checkout completed"
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            message: "Purchase completed successfully",
            purchase,
        }),
    ))
}
