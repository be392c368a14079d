//! User domain types.

use chrono::{DateTime, Utc};

use tradepost_core::{Email, UserId, Username};

/// A marketplace user (domain type).
///
/// The password hash never leaves the repository layer; login returns it
/// alongside the user only for verification.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Case-normalized email address, unique across users.
    pub email: Email,
    /// Display name, unique across users.
    pub username: Username,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}
