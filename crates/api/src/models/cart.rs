//! Cart domain types.
//!
//! A cart is per-user and holds (product, quantity) pairs. Products may be
//! deleted while referenced; readers treat those entries as dangling and
//! filter them from views without persisting the removal.

use rust_decimal::Decimal;
use serde::Serialize;

use tradepost_core::ProductId;

use super::product::ProductListing;

/// A stored cart item joined with its product, which may no longer exist.
#[derive(Debug, Clone)]
pub struct CartItemDetail {
    /// The referenced product ID, kept even when the product is gone.
    pub product_id: ProductId,
    /// Quantity, at least 1.
    pub quantity: i32,
    /// The live product, `None` when the reference dangles.
    pub product: Option<ProductListing>,
}

/// A valid cart line in the client-facing view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub product: ProductListing,
    pub quantity: i32,
}

/// The client-facing cart: valid entries plus the running total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub products: Vec<CartEntry>,
    pub total_amount: Decimal,
}

impl CartView {
    /// The view of an absent or empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            products: Vec::new(),
            total_amount: Decimal::ZERO,
        }
    }
}
