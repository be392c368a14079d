//! Product repository for catalog operations.
//!
//! Listing queries join the seller's username so read endpoints can return
//! products with their seller in one round trip. Search and category filters
//! are composed with `QueryBuilder` so the list and count queries stay in
//! sync.

use sqlx::{PgPool, Postgres, QueryBuilder};

use tradepost_core::{Category, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Product, ProductListing, SellerInfo};

/// Filters applied to the public product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter<'a> {
    /// Case-insensitive substring match over title and description.
    pub search: Option<&'a str>,
    /// Restrict to a single category.
    pub category: Option<Category>,
}

/// Fields of a product update; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
}

/// Product row joined with its seller.
#[derive(sqlx::FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    product: Product,
    seller_username: tradepost_core::Username,
}

impl From<ListingRow> for ProductListing {
    fn from(row: ListingRow) -> Self {
        let seller = SellerInfo {
            id: row.product.owner_user_id,
            username: row.seller_username,
        };
        Self {
            product: row.product,
            seller,
        }
    }
}

const LISTING_SELECT: &str = "SELECT p.id, p.title, p.description, p.category, p.price, \
     p.image_url, p.owner_user_id, p.created_at, u.username AS seller_username \
     FROM products p \
     JOIN users u ON u.id = p.owner_user_id";

/// Escape `LIKE` metacharacters in a user-supplied search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter<'_>) {
    if let Some(search) = filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = filter.category {
        builder.push(" AND p.category = ").push_bind(category);
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching the filter, newest first, paginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter<'_>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        builder.push(" WHERE TRUE");
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<ListingRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &ProductFilter<'_>) -> Result<i64, RepositoryError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products p WHERE TRUE");
        push_filter(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Get a product by ID, without seller information.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, title, description, category, price, image_url, owner_user_id, created_at \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product joined with its seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_listing(
        &self,
        id: ProductId,
    ) -> Result<Option<ProductListing>, RepositoryError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!("{LISTING_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new product owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        owner: UserId,
        title: &str,
        description: &str,
        category: Category,
        price: Price,
        image_url: &str,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "INSERT INTO products (title, description, category, price, image_url, owner_user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, title, description, category, price, image_url, owner_user_id, created_at",
        )
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(price)
        .bind(image_url)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 category = COALESCE($4, category), \
                 price = COALESCE($5, price), \
                 image_url = COALESCE($6, image_url) \
             WHERE id = $1 \
             RETURNING id, title, description, category, price, image_url, owner_user_id, created_at",
        )
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.category)
        .bind(changes.price)
        .bind(changes.image_url.as_deref())
        .fetch_optional(self.pool)
        .await?;

        product.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Cart items and purchase snapshots referencing it are left in place;
    /// readers filter the dangling references.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all products owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{LISTING_SELECT} WHERE p.owner_user_id = $1 ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count products owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_owner(&self, owner: UserId) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE owner_user_id = $1")
                .bind(owner)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// The most recently listed products of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_by_owner(
        &self,
        owner: UserId,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, title, description, category, price, image_url, owner_user_id, created_at \
             FROM products WHERE owner_user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(owner)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}
