//! Immutable orders and the cart snapshots they are built from.
//!
//! An order copies the price and name of every product at submission time.
//! Later catalog edits never reach back into an order that already exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DisplayPrice, OrderId, ProductId, Quantity, UserId};

/// Product data embedded in a submitted cart line.
///
/// Clients submit the product object they already resolved; any fields
/// beyond these three are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub new_price: DisplayPrice,
}

/// One line of a submitted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLine {
    #[serde(rename = "productId")]
    pub product: ProductSnapshot,
    #[serde(deserialize_with = "Quantity::deserialize_json")]
    pub quantity: Quantity,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub price: DisplayPrice,
    pub product_name: String,
}

impl From<SnapshotLine> for OrderItem {
    fn from(line: SnapshotLine) -> Self {
        Self {
            product_id: line.product.id,
            quantity: line.quantity,
            price: line.product.new_price,
            product_name: line.product.name,
        }
    }
}

/// An order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub date: DateTime<Utc>,
    pub payment_method: String,
}

impl NewOrder {
    /// Capture a cart snapshot as an order placed at `date`.
    #[must_use]
    pub fn from_snapshot(
        user_id: UserId,
        lines: Vec<SnapshotLine>,
        payment_method: String,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            items: lines.into_iter().map(OrderItem::from).collect(),
            date,
            payment_method,
        }
    }

    /// Attach the assigned ID, producing the stored order.
    #[must_use]
    pub fn with_id(self, id: OrderId) -> Order {
        Order {
            id,
            user_id: self.user_id,
            items: self.items,
            date: self.date,
            payment_method: self.payment_method,
        }
    }
}

/// A placed order. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub date: DateTime<Utc>,
    pub payment_method: String,
}
