//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use playtech_core::{Email, PhoneNumber, Role, UserId};

/// A storefront account (domain type).
///
/// Implements `Debug` manually to redact credential material.
#[derive(Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login handle, unique across accounts.
    pub username: String,
    /// Email address, unique across accounts.
    pub email: Email,
    /// Optional ten-digit phone number.
    pub phone_number: Option<PhoneNumber>,
    /// Authorization role.
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// SHA-256 hex digest of the outstanding reset token, if any.
    pub password_reset_token: Option<String>,
    /// When the outstanding reset token stops being accepted.
    pub password_reset_expires: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("role", &self.role)
            .field("password_hash", &"[REDACTED]")
            .field(
                "password_reset_token",
                &self.password_reset_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("password_reset_expires", &self.password_reset_expires)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Whether this account may perform admin-only operations.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Input for inserting a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: Email,
    pub password_hash: String,
}

/// The client-visible view of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: Email,
    pub phone_number: Option<PhoneNumber>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let mut user = fixtures::customer(1, "ana");
        user.password_reset_token = Some("deadbeef".to_string());
        let output = format!("{user:?}");

        assert!(output.contains("ana"));
        assert!(!output.contains("argon2id"));
        assert!(!output.contains("deadbeef"));
    }

    #[test]
    fn test_public_user_omits_credentials() {
        let user = fixtures::customer(7, "ana");
        let value = serde_json::to_value(PublicUser::from(&user)).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["username"], "ana");
        assert_eq!(value["role"], "customer");
        assert!(value["phoneNumber"].is_null());
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
