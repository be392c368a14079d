//! Purchase domain types.
//!
//! Purchase line items are a snapshot of the product's title and price at
//! checkout time, so history survives later edits or deletion of the source
//! product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{Price, ProductId, PurchaseId, UserId};

use super::product::ProductListing;

/// A purchase header row. Immutable once created.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
}

/// A snapshot line item within a purchase.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    /// The product that was purchased; the row it points at may be gone.
    pub product_id: ProductId,
    /// Title at checkout time.
    pub title: String,
    /// Unit price at checkout time.
    pub price: Price,
    /// Quantity, at least 1.
    pub quantity: i32,
}

/// A snapshot line item enriched with the live product where it still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemView {
    #[serde(flatten)]
    pub item: PurchaseItem,
    /// Live product and seller; `None` when the product has been deleted.
    pub product: Option<ProductListing>,
}

/// The client-facing purchase record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub products: Vec<PurchaseItemView>,
    pub total_amount: Price,
    pub created_at: DateTime<Utc>,
}
