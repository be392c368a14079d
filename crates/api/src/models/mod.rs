//! Domain models for the marketplace.
//!
//! These types represent validated domain objects separate from request and
//! response shapes, which live with their route handlers.

pub mod cart;
pub mod product;
pub mod purchase;
pub mod session;
pub mod user;

pub use cart::{CartEntry, CartItemDetail, CartView};
pub use product::{Product, ProductListing, SellerInfo};
pub use purchase::{Purchase, PurchaseItem, PurchaseItemView, PurchaseView};
pub use session::{CurrentUser, session_keys};
pub use user::User;
