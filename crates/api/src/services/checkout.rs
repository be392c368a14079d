//! Checkout service.
//!
//! Converts the cart into an immutable purchase record: load, filter
//! dangling items, snapshot title and price from the current product state,
//! persist, clear the cart.
//!
//! No transaction, lock, or idempotency key spans the whole sequence. The
//! purchase insert itself is atomic, but a crash between it and the cart
//! clear leaves both the purchase and the uncleared cart, and two
//! concurrent checkouts for the same user can each read the cart and each
//! record a purchase.

use rust_decimal::Decimal;
use sqlx::PgPool;

use tradepost_core::UserId;

use crate::db::carts::CartRepository;
use crate::db::purchases::PurchaseRepository;
use crate::error::{AppError, Result};
use crate::models::{CartItemDetail, Product, PurchaseItem, PurchaseView};

/// Checkout service.
pub struct CheckoutService<'a> {
    carts: CartRepository<'a>,
    purchases: PurchaseRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            purchases: PurchaseRepository::new(pool),
        }
    }

    /// Check out the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOperation` if the cart is absent, empty, or
    /// contains only dangling product references.
    pub async fn checkout(&self, user_id: UserId) -> Result<PurchaseView> {
        let cart_id = self
            .carts
            .get_cart_id(user_id)
            .await?
            .ok_or_else(|| AppError::InvalidOperation("Cart is empty".to_owned()))?;

        let items = self.carts.items_with_products(cart_id).await?;
        if items.is_empty() {
            return Err(AppError::InvalidOperation("Cart is empty".to_owned()));
        }

        let valid = valid_items(items);
        if valid.is_empty() {
            return Err(AppError::InvalidOperation(
                "No valid products in cart".to_owned(),
            ));
        }

        let (snapshot, total_amount) = snapshot_items(&valid);

        let purchase = self
            .purchases
            .create(user_id, &snapshot, total_amount)
            .await?;

        self.carts.clear_items(cart_id).await?;

        self.purchases
            .get_view(purchase.id)
            .await?
            .ok_or_else(|| AppError::Internal("purchase vanished after insert".to_owned()))
    }

    /// The user's purchase history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if a query fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<PurchaseView>> {
        let purchases = self.purchases.list_by_user(user_id, None).await?;
        Ok(purchases)
    }
}

/// Keep cart lines whose product still exists.
fn valid_items(items: Vec<CartItemDetail>) -> Vec<(Product, i32)> {
    items
        .into_iter()
        .filter_map(|item| item.product.map(|listing| (listing.product, item.quantity)))
        .collect()
}

/// Snapshot the valid cart lines into purchase items, totaling at current
/// prices. Title and price are copied so the record survives later product
/// edits and deletion.
fn snapshot_items(valid: &[(Product, i32)]) -> (Vec<PurchaseItem>, Decimal) {
    let mut total_amount = Decimal::ZERO;
    let items = valid
        .iter()
        .map(|(product, quantity)| {
            total_amount += product.price.times(*quantity);
            PurchaseItem {
                product_id: product.id,
                title: product.title.clone(),
                price: product.price,
                quantity: *quantity,
            }
        })
        .collect();

    (items, total_amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use tradepost_core::{Category, Price, ProductId, Username};

    use super::*;
    use crate::models::{ProductListing, SellerInfo};

    fn product(id: i32, title: &str, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_owned(),
            description: "desc".to_owned(),
            category: Category::Electronics,
            price: Price::parse(price).unwrap(),
            image_url: "/placeholder.svg".to_owned(),
            owner_user_id: UserId::new(50),
            created_at: Utc::now(),
        }
    }

    fn detail(id: i32, quantity: i32, product: Option<Product>) -> CartItemDetail {
        CartItemDetail {
            product_id: ProductId::new(id),
            quantity,
            product: product.map(|product| ProductListing {
                seller: SellerInfo {
                    id: product.owner_user_id,
                    username: Username::parse("seller").unwrap(),
                },
                product,
            }),
        }
    }

    #[test]
    fn test_snapshot_totals_price_times_quantity() {
        // Cart of {A: price 10 x2, B: price 5 x1} totals 25
        let valid = vec![
            (product(1, "A", Decimal::from(10)), 2),
            (product(2, "B", Decimal::from(5)), 1),
        ];

        let (items, total) = snapshot_items(&valid);
        assert_eq!(total, Decimal::from(25));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "A");
        assert_eq!(items[0].price.amount(), Decimal::from(10));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_snapshot_copies_title_and_price() {
        let valid = vec![(product(7, "Vintage Lamp", Decimal::new(1250, 2)), 1)];

        let (items, total) = snapshot_items(&valid);
        assert_eq!(items[0].product_id, ProductId::new(7));
        assert_eq!(items[0].title, "Vintage Lamp");
        assert_eq!(total, Decimal::new(1250, 2));
    }

    #[test]
    fn test_valid_items_drops_dangling_references() {
        let items = vec![
            detail(1, 2, Some(product(1, "A", Decimal::from(3)))),
            detail(2, 5, None),
            detail(3, 1, Some(product(3, "C", Decimal::from(4)))),
        ];

        let valid = valid_items(items);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].0.title, "A");
        assert_eq!(valid[1].0.title, "C");
    }

    #[test]
    fn test_all_dangling_yields_no_valid_items() {
        let items = vec![detail(1, 1, None), detail(2, 2, None)];
        assert!(valid_items(items).is_empty());
    }
}
