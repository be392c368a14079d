//! Product route handlers.
//!
//! The public listing supports case-insensitive substring search over title
//! and description, category filtering, and pagination. Mutations require
//! authentication and ownership.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradepost_core::{Category, Price, ProductId};

use crate::db::products::{ProductChanges, ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ProductListing;
use crate::state::AppState;

/// Image used when a listing is created without one.
const DEFAULT_IMAGE_URL: &str = "/placeholder.svg?height=300&width=300";

/// Default page size for the public listing.
const DEFAULT_PAGE_SIZE: i64 = 12;

// =============================================================================
// Request & Response Types
// =============================================================================

/// Query parameters for the public product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create-product request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// Update-product request body. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

/// Pagination block returned alongside the product list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// Response for the public listing.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductListing>,
    pub pagination: Pagination,
}

/// Response wrapping a single product.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ProductListing,
}

/// Response wrapping a list of products without pagination.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductListing>,
}

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_owned()));
    }
    if title.chars().count() > 100 {
        return Err(AppError::Validation(
            "Title must be less than 100 characters".to_owned(),
        ));
    }
    Ok(title.to_owned())
}

fn validate_description(description: &str) -> Result<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::Validation("Description is required".to_owned()));
    }
    if description.chars().count() > 1000 {
        return Err(AppError::Validation(
            "Description must be less than 1000 characters".to_owned(),
        ));
    }
    Ok(description.to_owned())
}

fn parse_category(category: &str) -> Result<Category> {
    category
        .parse::<Category>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn parse_price(price: Decimal) -> Result<Price> {
    Price::parse(price).map_err(|_| AppError::Validation("Price must be positive".to_owned()))
}

/// Clamp page/limit query values to sane positives.
fn normalize_paging(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    (page, limit)
}

// =============================================================================
// Handlers
// =============================================================================

/// Public product listing with search, category filter, and pagination.
///
/// # Errors
///
/// Returns 400 when the category filter names an unknown category.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>> {
    let (page, limit) = normalize_paging(query.page, query.limit);

    // The literal "All" (and an empty string) mean no category filter
    let category = match query.category.as_deref() {
        None | Some("" | "All") => None,
        Some(raw) => Some(parse_category(raw)?),
    };

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let filter = ProductFilter { search, category };

    let products = ProductRepository::new(state.pool());
    let total = products.count(&filter).await?;
    let listings = products.list(&filter, limit, (page - 1) * limit).await?;

    Ok(Json(ProductListResponse {
        products: listings,
        pagination: Pagination {
            page,
            limit,
            total,
            pages: (total + limit - 1) / limit,
        },
    }))
}

/// Create a product owned by the current user.
///
/// # Errors
///
/// Returns 400 on validation failure.
pub async fn create(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    let title = validate_title(&body.title)?;
    let description = validate_description(&body.description)?;
    let category = parse_category(&body.category)?;
    let price = parse_price(body.price)?;
    let image_url = body
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_URL);

    let products = ProductRepository::new(state.pool());
    let product = products
        .create(
            current.user_id,
            &title,
            &description,
            category,
            price,
            image_url,
        )
        .await?;

    let listing = products
        .get_listing(product.id)
        .await?
        .ok_or_else(|| AppError::Internal("product vanished after insert".to_owned()))?;

    tracing::info!(product_id = %listing.product.id, owner = %current.user_id, "product created");

    Ok((StatusCode::CREATED, Json(ProductResponse { product: listing })))
}

/// A single product with its seller.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let listing = ProductRepository::new(state.pool())
        .get_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(ProductResponse { product: listing }))
}

/// Update a product. Only the owner may do this.
///
/// # Errors
///
/// Returns 404 if absent, 403 if not the owner, 400 on validation failure.
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let products = ProductRepository::new(state.pool());

    let existing = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if existing.owner_user_id != current.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to update this product".to_owned(),
        ));
    }

    let changes = ProductChanges {
        title: body.title.as_deref().map(validate_title).transpose()?,
        description: body
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?,
        category: body.category.as_deref().map(parse_category).transpose()?,
        price: body.price.map(parse_price).transpose()?,
        image_url: body.image_url,
    };

    products.update(id, &changes).await?;

    let listing = products
        .get_listing(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(Json(ProductResponse { product: listing }))
}

/// Delete a product. Only the owner may do this.
///
/// Carts and purchase history referencing the product keep their rows; the
/// references dangle and readers filter them.
///
/// # Errors
///
/// Returns 404 if absent, 403 if not the owner.
pub async fn destroy(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    let products = ProductRepository::new(state.pool());

    let existing = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if existing.owner_user_id != current.user_id {
        return Err(AppError::Forbidden(
            "Not authorized to delete this product".to_owned(),
        ));
    }

    products.delete(id).await?;

    tracing::info!(product_id = %id, owner = %current.user_id, "product deleted");

    Ok(Json(MessageResponse {
        message: "Product deleted successfully",
    }))
}

/// The current user's own listings, newest first.
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn mine(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>> {
    let products = ProductRepository::new(state.pool())
        .list_by_owner(current.user_id)
        .await?;

    Ok(Json(ProductsResponse { products }))
}
