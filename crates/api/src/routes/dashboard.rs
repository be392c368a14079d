//! Dashboard route handlers.
//!
//! Aggregates the current user's marketplace activity: listing and purchase
//! counts, total spent, and the most recent items on each side.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::products::ProductRepository;
use crate::db::purchases::PurchaseRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Product, PurchaseView};
use crate::state::AppState;

/// How many recent listings/purchases to include.
const RECENT_LIMIT: i64 = 5;

/// Aggregate counters for the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub listings_count: i64,
    pub purchases_count: i64,
    pub total_spent: Decimal,
}

/// Dashboard response: counters plus recent activity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub recent_listings: Vec<Product>,
    pub recent_purchases: Vec<PurchaseView>,
}

/// The current user's dashboard statistics.
///
/// # Errors
///
/// Returns 500 if a query fails.
pub async fn stats(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>> {
    let products = ProductRepository::new(state.pool());
    let purchases = PurchaseRepository::new(state.pool());

    let listings_count = products.count_by_owner(current.user_id).await?;
    let purchase_stats = purchases.stats_for_user(current.user_id).await?;
    let recent_listings = products
        .recent_by_owner(current.user_id, RECENT_LIMIT)
        .await?;
    let recent_purchases = purchases
        .list_by_user(current.user_id, Some(RECENT_LIMIT))
        .await?;

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            listings_count,
            purchases_count: purchase_stats.purchases_count,
            total_spent: purchase_stats.total_spent,
        },
        recent_listings,
        recent_purchases,
    }))
}
