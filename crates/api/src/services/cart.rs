//! Cart service.
//!
//! Implements the cart operations: add (with merge semantics and the
//! self-purchase rule), idempotent remove, quantity update, and the joined
//! read that filters dangling product references without persisting the
//! removal.

use sqlx::PgPool;

use tradepost_core::{ProductId, UserId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::{CartEntry, CartItemDetail, CartView};

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Add a quantity of a product to the user's cart, creating the cart on
    /// first use. An existing line for the same product merges quantities.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product doesn't exist.
    /// Returns `AppError::InvalidOperation` if the user owns the product.
    /// Returns `AppError::Validation` if the quantity is below 1.
    pub async fn add(&self, user_id: UserId, product_id: ProductId, quantity: i32) -> Result<()> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be at least 1".to_owned(),
            ));
        }

        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

        if product.owner_user_id == user_id {
            return Err(AppError::InvalidOperation(
                "You cannot add your own product to cart".to_owned(),
            ));
        }

        let cart_id = self.carts.ensure_cart(user_id).await?;
        self.carts.add_item(cart_id, product_id, quantity).await?;

        Ok(())
    }

    /// Remove a product from the user's cart. Removing an item that is not
    /// in the cart is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user has no cart at all.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<()> {
        let cart_id = self
            .carts
            .get_cart_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart not found".to_owned()))?;

        self.carts.remove_item(cart_id, product_id).await?;

        Ok(())
    }

    /// Set the quantity of a product already in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the quantity is below 1.
    /// Returns `AppError::NotFound` if the cart or the item is absent.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<()> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be at least 1".to_owned(),
            ));
        }

        let cart_id = self
            .carts
            .get_cart_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart not found".to_owned()))?;

        self.carts
            .set_quantity(cart_id, product_id, quantity)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => {
                    AppError::NotFound("Product not found in cart".to_owned())
                }
                other => AppError::Database(other),
            })?;

        Ok(())
    }

    /// The user's cart as the client-facing view: dangling items filtered,
    /// total computed from current prices. An absent cart reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if a query fails.
    pub async fn read(&self, user_id: UserId) -> Result<CartView> {
        let Some(cart_id) = self.carts.get_cart_id(user_id).await? else {
            return Ok(CartView::empty());
        };

        let items = self.carts.items_with_products(cart_id).await?;

        Ok(build_view(items))
    }
}

/// Build the cart view from joined items: keep lines whose product still
/// exists and total them at current prices. The dangling lines stay in the
/// store untouched.
fn build_view(items: Vec<CartItemDetail>) -> CartView {
    let products: Vec<CartEntry> = items
        .into_iter()
        .filter_map(|item| {
            item.product.map(|product| CartEntry {
                product,
                quantity: item.quantity,
            })
        })
        .collect();

    let total_amount = products
        .iter()
        .map(|entry| entry.product.product.price.times(entry.quantity))
        .sum();

    CartView {
        products,
        total_amount,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use tradepost_core::{Category, Price, Username};

    use super::*;
    use crate::models::{Product, ProductListing, SellerInfo};

    fn listing(id: i32, price: Decimal) -> ProductListing {
        ProductListing {
            product: Product {
                id: ProductId::new(id),
                title: format!("Product {id}"),
                description: "A fine item".to_owned(),
                category: Category::Other,
                price: Price::parse(price).unwrap(),
                image_url: "/placeholder.svg".to_owned(),
                owner_user_id: UserId::new(99),
                created_at: Utc::now(),
            },
            seller: SellerInfo {
                id: UserId::new(99),
                username: Username::parse("seller").unwrap(),
            },
        }
    }

    #[test]
    fn test_build_view_totals_current_prices() {
        let items = vec![
            CartItemDetail {
                product_id: ProductId::new(1),
                quantity: 2,
                product: Some(listing(1, Decimal::from(10))),
            },
            CartItemDetail {
                product_id: ProductId::new(2),
                quantity: 1,
                product: Some(listing(2, Decimal::from(5))),
            },
        ];

        let view = build_view(items);
        assert_eq!(view.products.len(), 2);
        assert_eq!(view.total_amount, Decimal::from(25));
    }

    #[test]
    fn test_build_view_filters_dangling_items() {
        let items = vec![
            CartItemDetail {
                product_id: ProductId::new(1),
                quantity: 3,
                product: None,
            },
            CartItemDetail {
                product_id: ProductId::new(2),
                quantity: 1,
                product: Some(listing(2, Decimal::from(7))),
            },
        ];

        let view = build_view(items);
        assert_eq!(view.products.len(), 1);
        assert_eq!(view.total_amount, Decimal::from(7));
    }

    #[test]
    fn test_build_view_empty() {
        let view = build_view(Vec::new());
        assert!(view.products.is_empty());
        assert_eq!(view.total_amount, Decimal::ZERO);
    }
}
