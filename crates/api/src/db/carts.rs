//! Cart repository.
//!
//! One cart row per user, created lazily on first add. Items live in
//! `cart_items` keyed by `(cart_id, product_id)`, so adding an existing
//! product merges quantities in a single upsert instead of appending a
//! duplicate row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tradepost_core::{CartId, Category, Price, ProductId, UserId, Username};

use super::RepositoryError;
use crate::models::{CartItemDetail, Product, ProductListing, SellerInfo};

/// Cart item row left-joined with its product and seller; the product
/// columns are null when the reference dangles.
#[derive(sqlx::FromRow)]
struct CartEntryRow {
    product_id: ProductId,
    quantity: i32,
    id: Option<ProductId>,
    title: Option<String>,
    description: Option<String>,
    category: Option<Category>,
    price: Option<Price>,
    image_url: Option<String>,
    owner_user_id: Option<UserId>,
    created_at: Option<DateTime<Utc>>,
    seller_username: Option<Username>,
}

impl From<CartEntryRow> for CartItemDetail {
    fn from(row: CartEntryRow) -> Self {
        let product = match (
            row.id,
            row.title,
            row.description,
            row.category,
            row.price,
            row.image_url,
            row.owner_user_id,
            row.created_at,
            row.seller_username,
        ) {
            (
                Some(id),
                Some(title),
                Some(description),
                Some(category),
                Some(price),
                Some(image_url),
                Some(owner_user_id),
                Some(created_at),
                Some(seller_username),
            ) => Some(ProductListing {
                product: Product {
                    id,
                    title,
                    description,
                    category,
                    price,
                    image_url,
                    owner_user_id,
                    created_at,
                },
                seller: SellerInfo {
                    id: owner_user_id,
                    username: seller_username,
                },
            }),
            _ => None,
        };

        Self {
            product_id: row.product_id,
            quantity: row.quantity,
            product,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the ID of a user's cart, if one has been created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_cart_id(&self, user_id: UserId) -> Result<Option<CartId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartId>("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(id)
    }

    /// Get the user's cart, creating an empty one if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure_cart(&self, user_id: UserId) -> Result<CartId, RepositoryError> {
        let id = sqlx::query_scalar::<_, CartId>(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW() \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Add a quantity of a product to the cart, merging with any existing
    /// line for the same product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        self.touch(cart_id).await
    }

    /// Remove a product from the cart. Removing an absent item is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        self.touch(cart_id).await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .bind(quantity)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.touch(cart_id).await
    }

    /// All items in a cart, each left-joined with its product and seller.
    ///
    /// Dangling references come back with `product: None`; callers decide
    /// whether to filter. Nothing is removed here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_with_products(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<CartItemDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartEntryRow>(
            "SELECT ci.product_id, ci.quantity, \
                    p.id, p.title, p.description, p.category, p.price, \
                    p.image_url, p.owner_user_id, p.created_at, \
                    u.username AS seller_username \
             FROM cart_items ci \
             LEFT JOIN products p ON p.id = ci.product_id \
             LEFT JOIN users u ON u.id = p.owner_user_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.product_id",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete all items from a cart. The cart row itself is kept, so the
    /// cart returns to the "empty" state rather than "absent".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_items(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        self.touch(cart_id).await
    }

    /// Bump the cart's `updated_at` timestamp.
    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE carts SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
