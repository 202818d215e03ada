//! Session-related types.
//!
//! The session itself is a signed token held by the client; nothing is kept
//! server-side between requests.

use playtech_core::{Role, UserId};

use super::user::User;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "access_token";

/// The authenticated caller, resolved fresh from the store on every request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The full account record.
    pub user: User,
    /// Role at the time the request was resolved.
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: User) -> Self {
        let role = user.role;
        Self { user, role }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
