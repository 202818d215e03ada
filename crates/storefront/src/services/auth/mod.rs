//! Account service.
//!
//! Signup, login, the password reset lifecycle, profile updates and role
//! elevation. Passwords are stored as Argon2id PHC strings; reset tokens are
//! stored only as their SHA-256 digest.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;

use playtech_core::{Email, PhoneNumber, Role};

use crate::config::StorefrontConfig;
use crate::db::{CartStore, RepositoryError, UserStore};
use crate::models::{CurrentUser, NewUser, User};
use crate::services::email::{Mailer, OutgoingEmail};
use crate::services::token::{SessionToken, SessionTokens};
use crate::state::AppState;

/// How long a password reset link stays valid.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(24);

const MISSING_FIELDS: &str = "Missing required fields.";
const PASSWORDS_DIFFER: &str = "Passwords do not match";
const SAME_PASSWORD: &str = "New password cannot be the same as the current password";

/// Signup request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Change-password request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: Option<String>,
    pub new_password: String,
    pub confirm_password: String,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub token: SessionToken,
}

/// Result of a role elevation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// The target's role was changed to admin.
    Promoted,
    /// The target was already an admin; nothing changed.
    AlreadyAdmin,
}

/// Account service.
pub struct AuthService<'a> {
    users: &'a dyn UserStore,
    carts: &'a dyn CartStore,
    tokens: &'a SessionTokens,
    mailer: &'a dyn Mailer,
    config: &'a StorefrontConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new account service over the shared application state.
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            users: state.stores().users.as_ref(),
            carts: state.stores().carts.as_ref(),
            tokens: state.tokens(),
            mailer: state.mailer(),
            config: state.config(),
        }
    }

    // =========================================================================
    // Signup & Login
    // =========================================================================

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for mismatched passwords or bad input,
    /// `AuthError::EmailTaken` / `AuthError::UsernameTaken` on collisions.
    #[instrument(skip_all, fields(username = %input.username))]
    pub async fn signup(&self, input: SignupInput) -> Result<User, AuthError> {
        if input.password != input.confirm_password {
            return Err(AuthError::validation(PASSWORDS_DIFFER));
        }
        let name = input.name.trim();
        let username = input.username.trim();
        if name.is_empty() || username.is_empty() || input.password.is_empty() {
            return Err(AuthError::validation(MISSING_FIELDS));
        }
        let email = Email::parse(&input.email)
            .map_err(|e| AuthError::Validation(format!("Invalid email: {e}")))?;

        // Email collision is reported first when both collide.
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                name: name.to_owned(),
                username: username.to_owned(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint) if constraint.contains("email") => {
                    AuthError::EmailTaken
                }
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Login with username and password.
    ///
    /// Issues a session token and makes sure the user has a cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown username and
    /// `AuthError::InvalidCredentials` for a wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(password, &user.password_hash)?;

        let token = self.tokens.issue(user.id)?;
        self.carts.ensure(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, token })
    }

    // =========================================================================
    // Password Lifecycle
    // =========================================================================

    /// Email a password reset link to the account owning `email`.
    ///
    /// Only the digest of the token is stored; the plaintext exists solely in
    /// the emailed link.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown email and
    /// `AuthError::Mail` if delivery fails.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<Email, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let token = generate_reset_token();
        let expires = Utc::now() + RESET_TOKEN_TTL;
        self.users
            .set_reset_token(user.id, Some((&hash_reset_token(&token), expires)))
            .await?;

        let link = self.config.reset_link(&token);
        let message = OutgoingEmail::password_reset(&user.email, &user.name, &link)?;
        self.mailer.send(message).await?;

        tracing::info!(user_id = %user.id, "Password reset link sent");
        Ok(user.email)
    }

    /// Set a new password using an emailed reset token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for mismatched or unchanged passwords,
    /// `AuthError::ResetLinkInvalid` if no account holds the token, and
    /// `AuthError::ResetLinkExpired` if it matched but has expired.
    #[instrument(skip_all)]
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        if password != confirm_password {
            return Err(AuthError::validation(PASSWORDS_DIFFER));
        }
        if password.is_empty() {
            return Err(AuthError::validation(MISSING_FIELDS));
        }

        let user = self
            .users
            .find_by_reset_token(&hash_reset_token(token))
            .await?
            .ok_or(AuthError::ResetLinkInvalid)?;

        let live = user
            .password_reset_expires
            .is_some_and(|expires| expires > Utc::now());
        if !live {
            self.users.set_reset_token(user.id, None).await?;
            tracing::info!(user_id = %user.id, "Rejected expired reset token");
            return Err(AuthError::ResetLinkExpired);
        }

        if verify_password(password, &user.password_hash).is_ok() {
            return Err(AuthError::validation(SAME_PASSWORD));
        }

        let hash = hash_password(password)?;
        self.users.set_password_hash(user.id, &hash).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    /// Change the password of a logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the supplied current password is
    /// wrong, the new password equals the current one, or the confirmation
    /// differs.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn change_password(
        &self,
        user: &User,
        input: ChangePasswordInput,
    ) -> Result<(), AuthError> {
        let current = input.current_password.filter(|p| !p.is_empty());
        if let Some(current) = &current
            && verify_password(current, &user.password_hash).is_err()
        {
            return Err(AuthError::validation("Invalid current password"));
        }
        if input.new_password.is_empty() {
            return Err(AuthError::validation(MISSING_FIELDS));
        }
        if current.as_deref() == Some(input.new_password.as_str())
            || verify_password(&input.new_password, &user.password_hash).is_ok()
        {
            return Err(AuthError::validation(SAME_PASSWORD));
        }
        if input.new_password != input.confirm_password {
            return Err(AuthError::validation("New passwords do not match"));
        }

        let hash = hash_password(&input.new_password)?;
        self.users.set_password_hash(user.id, &hash).await?;

        tracing::info!("Password changed");
        Ok(())
    }

    // =========================================================================
    // Profile & Roles
    // =========================================================================

    /// Grant the admin role to the account named `username`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown target and
    /// `AuthError::Forbidden` if the caller is not an admin.
    #[instrument(skip(self, caller), fields(caller_id = %caller.id()))]
    pub async fn promote_to_admin(
        &self,
        caller: &CurrentUser,
        username: &str,
    ) -> Result<Promotion, AuthError> {
        let target = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !caller.is_admin() {
            return Err(AuthError::Forbidden);
        }
        if target.is_admin() {
            return Ok(Promotion::AlreadyAdmin);
        }

        self.users.set_role(target.id, Role::Admin).await?;
        tracing::info!(target_id = %target.id, "User promoted to admin");
        Ok(Promotion::Promoted)
    }

    /// Change the display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the name is blank.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_name(&self, user: &User, name: &str) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::validation("Name cannot be empty"));
        }
        Ok(self.users.set_name(user.id, name).await?)
    }

    /// Change the phone number.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` unless the input is exactly ten digits.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update_phone_number(&self, user: &User, phone: &str) -> Result<User, AuthError> {
        let phone = PhoneNumber::parse(phone)
            .map_err(|_| AuthError::validation("Invalid phone number format"))?;
        Ok(self.users.set_phone_number(user.id, &phone).await?)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a random reset token (32 bytes, hex-encoded).
fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 digest of a reset token, hex-encoded. This is what gets stored.
fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
