//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB ping)
//!
//! # Auth
//! POST /auth/signup            - Create account, start session
//! POST /auth/login             - Login, start session
//! POST /auth/logout            - End session
//! GET  /auth/me                - Current user
//! PUT  /auth/profile           - Update username/email
//!
//! # Products
//! GET    /products             - Public listing (search, category, pagination)
//! POST   /products             - Create listing (auth)
//! GET    /products/user        - Own listings (auth)
//! GET    /products/{id}        - Single product
//! PUT    /products/{id}        - Update (auth + ownership)
//! DELETE /products/{id}        - Delete (auth + ownership)
//!
//! # Cart (auth)
//! GET  /cart                   - Cart view with totals
//! POST /cart/add               - Add product (quantities merge)
//! POST /cart/update            - Set quantity
//! POST /cart/remove            - Remove product (idempotent per item)
//!
//! # Purchases (auth)
//! GET  /purchases              - Purchase history
//! POST /purchases              - Checkout the cart
//!
//! # Dashboard (auth)
//! GET  /dashboard/stats        - Aggregate counts and recent activity
//! ```

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod products;
pub mod purchases;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/user", get(products::mine))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route(
            "/purchases",
            get(purchases::history).post(purchases::checkout),
        )
        .route("/dashboard/stats", get(dashboard::stats))
}
