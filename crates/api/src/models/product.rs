//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{Category, Price, ProductId, UserId, Username};

/// A product listed on the marketplace.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Listing title (1-100 characters).
    pub title: String,
    /// Listing description (1-1000 characters).
    pub description: String,
    /// One of the fixed categories.
    pub category: Category,
    /// Asking price, non-negative.
    pub price: Price,
    /// Image URL (defaulted at creation when omitted).
    pub image_url: String,
    /// The user who listed this product. Only the owner may mutate it.
    pub owner_user_id: UserId,
    /// When the product was listed.
    pub created_at: DateTime<Utc>,
}

/// Public information about a product's seller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub id: UserId,
    pub username: Username,
}

/// A product joined with its seller, the shape returned by read endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub seller: SellerInfo,
}
