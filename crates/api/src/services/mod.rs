//! Domain services.
//!
//! Services compose repositories into the marketplace's operations. They
//! receive store handles and the acting user's ID explicitly; nothing here
//! reads ambient state or touches the HTTP layer.

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::AuthService;
pub use cart::CartService;
pub use checkout::CheckoutService;
