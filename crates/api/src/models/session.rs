//! Session-stored types.

use serde::{Deserialize, Serialize};

use tradepost_core::UserId;

use super::user::User;

/// Session keys for stored values.
pub mod session_keys {
    /// Key under which the authenticated identity is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated identity carried by the session.
///
/// Written at signup/login, refreshed on profile update, removed at logout.
/// Route handlers receive this via the `RequireAuth` extractor; domain
/// operations take the `user_id` and never see the session itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.as_str().to_owned(),
            username: user.username.as_str().to_owned(),
        }
    }
}
