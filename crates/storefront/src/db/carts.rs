//! `PostgreSQL` cart storage.
//!
//! A cart is one row per user with its line items in a JSONB column, so every
//! mutation is a single-row write. Saves are guarded by the `version` column.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use playtech_core::{Cart, CartId, LineItem, UserId};

use super::{CartStore, RepositoryError, map_unique_violation};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    items: Json<Vec<LineItem>>,
    version: i64,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            version: row.version,
        }
    }
}

/// Cart storage backed by the `carts` table.
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, items, version FROM carts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Cart::from))
    }

    async fn create(
        &self,
        user_id: UserId,
        items: Vec<LineItem>,
    ) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            INSERT INTO carts (user_id, items)
            VALUES ($1, $2)
            RETURNING id, user_id, items, version
            ",
        )
        .bind(user_id)
        .bind(Json(items))
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(row.into())
    }

    async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.find_by_user(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            UPDATE carts
            SET items = $2, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $3
            RETURNING id, user_id, items, version
            ",
        )
        .bind(cart.id)
        .bind(Json(&cart.items))
        .bind(cart.version)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Distinguish a lost race from a deleted cart.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM carts WHERE id = $1)")
            .bind(cart.id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            Err(RepositoryError::Conflict("stale cart version".to_owned()))
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
