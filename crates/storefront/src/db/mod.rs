//! Persistence for the storefront `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts, password hashes and outstanding reset tokens
//! - `products` - The catalog
//! - `carts` - One row per user; line items are a JSONB document
//! - `orders` - Immutable order snapshots; line items are a JSONB document
//!
//! Each store is a trait so services can run against the in-memory
//! implementations in tests. The `PostgreSQL` implementations live in the
//! per-table submodules.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p playtech-cli -- migrate
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use playtech_core::{
    Cart, Email, LineItem, NewOrder, NewProduct, Order, PhoneNumber, Product, ProductId, Role,
    UserId,
};

use crate::models::{NewUser, User};

pub mod carts;
#[cfg(test)]
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

pub use carts::PgCartStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email) or a stale cart version.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-violation into [`RepositoryError::Conflict`] carrying the
/// violated constraint name.
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(e)
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Find the user whose stored reset-token digest equals `token_hash`.
    async fn find_by_reset_token(&self, token_hash: &str)
    -> Result<Option<User>, RepositoryError>;

    /// Insert a new customer account.
    ///
    /// Returns `Conflict` naming the violated constraint (`users_email_key`
    /// or `users_username_key`) if the email or username is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Replace the password hash and clear any outstanding reset token.
    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError>;

    /// Store or clear the reset-token digest and its expiry.
    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> Result<(), RepositoryError>;

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), RepositoryError>;

    async fn set_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError>;

    async fn set_phone_number(
        &self,
        id: UserId,
        phone: &PhoneNumber,
    ) -> Result<User, RepositoryError>;
}

/// Catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch every product whose id is in `ids`. Unknown ids are skipped.
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError>;
}

/// Cart storage.
///
/// Writes are compare-and-swap on [`Cart::version`].
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Create a cart holding `items`.
    ///
    /// Returns `Conflict` if the user already has one.
    async fn create(&self, user_id: UserId, items: Vec<LineItem>)
    -> Result<Cart, RepositoryError>;

    /// Create an empty cart unless one exists. Returns the user's cart either way.
    async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError>;

    /// Persist `cart.items` if the stored version still equals `cart.version`.
    ///
    /// Returns the saved cart with its bumped version, `Conflict` if another
    /// writer saved first, or `NotFound` if the cart was deleted.
    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError>;

    /// Delete the user's cart. Returns `false` if there was none.
    async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError>;
}

/// Order storage. Orders are insert-only.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders placed by the user, oldest first.
    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;
}

/// Handles to every store, shared across handlers.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            carts: Arc::new(PgCartStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
        }
    }

    /// Fresh, empty in-memory stores.
    #[cfg(test)]
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(memory::MemoryUserStore::default()),
            products: Arc::new(memory::MemoryProductStore::default()),
            carts: Arc::new(memory::MemoryCartStore::default()),
            orders: Arc::new(memory::MemoryOrderStore::default()),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
