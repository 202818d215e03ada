//! `PostgreSQL` order storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use playtech_core::{NewOrder, Order, OrderId, OrderItem, UserId};

use super::{OrderStore, RepositoryError};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<OrderItem>>,
    date: DateTime<Utc>,
    payment_method: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            items: row.items.0,
            date: row.date,
            payment_method: row.payment_method,
        }
    }
}

/// Order storage backed by the `orders` table.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, items, date, payment_method)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, items, date, payment_method
            ",
        )
        .bind(order.user_id)
        .bind(Json(&order.items))
        .bind(order.date)
        .bind(&order.payment_method)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, items, date, payment_method
            FROM orders
            WHERE user_id = $1
            ORDER BY date, id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}
