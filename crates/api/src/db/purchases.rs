//! Purchase repository.
//!
//! Purchases are append-only: a header row plus snapshot item rows, written
//! together in one transaction. Nothing updates or deletes them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tradepost_core::{Category, Price, ProductId, PurchaseId, UserId, Username};

use super::RepositoryError;
use crate::models::{
    Product, ProductListing, Purchase, PurchaseItem, PurchaseItemView, PurchaseView, SellerInfo,
};

/// Aggregate purchase figures for one user.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct PurchaseStats {
    pub purchases_count: i64,
    pub total_spent: Decimal,
}

/// Snapshot item row left-joined with the live product and seller.
#[derive(sqlx::FromRow)]
struct PurchaseItemRow {
    purchase_id: PurchaseId,
    #[sqlx(flatten)]
    item: PurchaseItem,
    live_id: Option<ProductId>,
    live_title: Option<String>,
    live_description: Option<String>,
    live_category: Option<Category>,
    live_price: Option<Price>,
    live_image_url: Option<String>,
    live_owner_user_id: Option<UserId>,
    live_created_at: Option<DateTime<Utc>>,
    seller_username: Option<Username>,
}

impl PurchaseItemRow {
    fn into_view(self) -> (PurchaseId, PurchaseItemView) {
        let product = match (
            self.live_id,
            self.live_title,
            self.live_description,
            self.live_category,
            self.live_price,
            self.live_image_url,
            self.live_owner_user_id,
            self.live_created_at,
            self.seller_username,
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

        (
            self.purchase_id,
            PurchaseItemView {
                item: self.item,
                product,
            },
        )
    }
}

const ITEM_SELECT: &str = "SELECT pi.purchase_id, pi.product_id, pi.title, pi.price, pi.quantity, \
            p.id AS live_id, p.title AS live_title, p.description AS live_description, \
            p.category AS live_category, p.price AS live_price, \
            p.image_url AS live_image_url, p.owner_user_id AS live_owner_user_id, \
            p.created_at AS live_created_at, u.username AS seller_username \
     FROM purchase_items pi \
     LEFT JOIN products p ON p.id = pi.product_id \
     LEFT JOIN users u ON u.id = p.owner_user_id";

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a purchase with its snapshot items.
    ///
    /// The header and item rows are written in a single transaction so a
    /// purchase can never exist half-recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        items: &[PurchaseItem],
        total_amount: Decimal,
    ) -> Result<Purchase, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let purchase = sqlx::query_as::<_, Purchase>(
            "INSERT INTO purchases (user_id, total_amount) \
             VALUES ($1, $2) \
             RETURNING id, user_id, total_amount, created_at",
        )
        .bind(user_id)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO purchase_items (purchase_id, product_id, title, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(purchase.id)
            .bind(item.product_id)
            .bind(&item.title)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(purchase)
    }

    /// Get a single purchase as the client-facing view.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_view(
        &self,
        id: PurchaseId,
    ) -> Result<Option<PurchaseView>, RepositoryError> {
        let header = sqlx::query_as::<_, Purchase>(
            "SELECT id, user_id, total_amount, created_at FROM purchases WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "{ITEM_SELECT} WHERE pi.purchase_id = $1 ORDER BY pi.product_id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let products = rows.into_iter().map(|r| r.into_view().1).collect();

        Ok(Some(assemble_view(header, products)))
    }

    /// A user's purchase history, newest first, optionally limited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        limit: Option<i64>,
    ) -> Result<Vec<PurchaseView>, RepositoryError> {
        let headers = match limit {
            Some(limit) => {
                sqlx::query_as::<_, Purchase>(
                    "SELECT id, user_id, total_amount, created_at FROM purchases \
                     WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
                )
                .bind(user_id)
                .bind(limit)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Purchase>(
                    "SELECT id, user_id, total_amount, created_at FROM purchases \
                     WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
                )
                .bind(user_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "{ITEM_SELECT} WHERE pi.purchase_id = ANY($1) ORDER BY pi.purchase_id, pi.product_id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_purchase: HashMap<PurchaseId, Vec<PurchaseItemView>> = HashMap::new();
        for row in rows {
            let (purchase_id, view) = row.into_view();
            items_by_purchase.entry(purchase_id).or_default().push(view);
        }

        Ok(headers
            .into_iter()
            .map(|header| {
                let products = items_by_purchase.remove(&header.id).unwrap_or_default();
                assemble_view(header, products)
            })
            .collect())
    }

    /// Purchase count and total spent for one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats_for_user(&self, user_id: UserId) -> Result<PurchaseStats, RepositoryError> {
        let stats = sqlx::query_as::<_, PurchaseStats>(
            "SELECT COUNT(*) AS purchases_count, \
                    COALESCE(SUM(total_amount), 0) AS total_spent \
             FROM purchases WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }
}

fn assemble_view(header: Purchase, products: Vec<PurchaseItemView>) -> PurchaseView {
    PurchaseView {
        id: header.id,
        user_id: header.user_id,
        products,
        total_amount: header.total_amount,
        created_at: header.created_at,
    }
}
