//! Order service.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use playtech_core::{NewOrder, Order, OrderId, SnapshotLine, UserId};

use crate::db::{OrderStore, RepositoryError};
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum OrderError {
    /// `cart` was absent or not an array.
    #[error("No items in your cart!")]
    NoItems,

    #[error("Invalid cart item at position {index}: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("Payment method is required.")]
    MissingPaymentMethod,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Order submission body: the client's resolved cart plus a payment label.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitOrderInput {
    pub cart: Option<Value>,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: Option<String>,
}

pub struct OrderService<'a> {
    orders: &'a dyn OrderStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            orders: state.stores().orders.as_ref(),
        }
    }

    /// Place an order from the submitted cart snapshot.
    ///
    /// Prices and names are taken from the snapshot, not the catalog. The
    /// stored cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoItems` when `cart` is not an array,
    /// `InvalidItem` for a malformed line and `MissingPaymentMethod` for a
    /// blank payment method.
    #[instrument(skip(self, input))]
    pub async fn submit(
        &self,
        user_id: UserId,
        input: SubmitOrderInput,
    ) -> Result<OrderId, OrderError> {
        let lines = parse_lines(input.cart)?;
        let payment_method = input
            .payment_method
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty())
            .ok_or(OrderError::MissingPaymentMethod)?;

        let order = NewOrder::from_snapshot(user_id, lines, payment_method, Utc::now());
        let order = self.orders.create(order).await?;
        tracing::info!(order_id = %order.id, items = order.items.len(), "Order placed");
        Ok(order.id)
    }

    /// The user's orders, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list_by_user(user_id).await?)
    }
}

fn parse_lines(cart: Option<Value>) -> Result<Vec<SnapshotLine>, OrderError> {
    let Some(Value::Array(raw)) = cart else {
        return Err(OrderError::NoItems);
    };

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| OrderError::InvalidItem {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use playtech_core::NewProduct;

    use super::*;
    use crate::db::Stores;
    use crate::db::memory::MemoryProductStore;
    use crate::state::{test_state, test_state_with_stores};

    const USER: UserId = UserId::new(1);

    fn input(cart: Value, payment: &str) -> SubmitOrderInput {
        SubmitOrderInput {
            cart: Some(cart),
            payment_method: Some(payment.to_string()),
        }
    }

    fn line(id: i32, name: &str, price: &str, quantity: u32) -> Value {
        json!({
            "productId": { "id": id, "name": name, "new_price": price, "category": "extra" },
            "quantity": quantity,
        })
    }

    #[tokio::test]
    async fn test_submit_snapshots_each_line() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);

        let order_id = service
            .submit(
                USER,
                input(json!([line(1, "PS5", "49990", 1), line(2, "Pad", "5990", 2)]), "UPI"),
            )
            .await
            .unwrap();

        let orders = service.list(USER).await.unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.id, order_id);
        assert_eq!(order.payment_method, "UPI");
        assert_eq!(order.items[1].product_name, "Pad");
        assert_eq!(order.items[1].price.as_str(), "5990");
        assert_eq!(order.items[1].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_or_non_array_cart() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);

        for cart in [None, Some(json!({})), Some(json!("x")), Some(json!(null))] {
            let err = service
                .submit(
                    USER,
                    SubmitOrderInput {
                        cart,
                        payment_method: Some("COD".to_string()),
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::NoItems));
        }
        assert!(service.list(USER).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_malformed_line() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);

        let no_product = json!([{ "productId": 1, "quantity": 1 }]);
        let err = service.submit(USER, input(no_product, "COD")).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidItem { index: 0, .. }));

        let zero = json!([line(1, "PS5", "1", 1), line(2, "Pad", "1", 0)]);
        let err = service.submit(USER, input(zero, "COD")).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidItem { index: 1, .. }));
    }

    #[tokio::test]
    async fn test_whole_float_quantity_is_accepted_like_the_cart() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);
        let mut two = line(1, "PS5", "49990", 1);
        two["quantity"] = json!(2.0);

        service.submit(USER, input(json!([two]), "COD")).await.unwrap();
        assert_eq!(service.list(USER).await.unwrap()[0].items[0].quantity.get(), 2);

        let mut half = line(1, "PS5", "49990", 1);
        half["quantity"] = json!(1.5);
        let err = service.submit(USER, input(json!([half]), "COD")).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidItem { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_empty_cart_array_is_accepted() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);
        service.submit(USER, input(json!([]), "COD")).await.unwrap();

        let orders = service.list(USER).await.unwrap();
        assert!(orders[0].items.is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_payment_method() {
        let (state, _) = test_state();
        let err = OrderService::new(&state)
            .submit(USER, input(json!([line(1, "PS5", "1", 1)]), "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::MissingPaymentMethod));
    }

    #[tokio::test]
    async fn test_catalog_edit_does_not_change_placed_order() {
        let products = Arc::new(MemoryProductStore::default());
        let mut stores = Stores::in_memory();
        stores.products = products.clone();
        let state = test_state_with_stores(stores);

        let ps5 = state
            .stores()
            .products
            .create(NewProduct {
                name: "PS5".to_string(),
                new_price: "49990".into(),
                ..NewProduct::default()
            })
            .await
            .unwrap();
        let snapshot = serde_json::to_value(&ps5).unwrap();
        let service = OrderService::new(&state);
        service
            .submit(
                USER,
                input(json!([{ "productId": snapshot, "quantity": 1 }]), "Card"),
            )
            .await
            .unwrap();

        let mut edited = ps5.clone();
        edited.name = "PS5 Pro".to_string();
        edited.new_price = "69990".into();
        products.replace(edited);

        let orders = service.list(USER).await.unwrap();
        assert_eq!(orders[0].items[0].price.as_str(), "49990");
        assert_eq!(orders[0].items[0].product_name, "PS5");
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user_and_oldest_first() {
        let (state, _) = test_state();
        let service = OrderService::new(&state);
        let first = service
            .submit(USER, input(json!([line(1, "A", "1", 1)]), "COD"))
            .await
            .unwrap();
        let second = service
            .submit(USER, input(json!([line(2, "B", "1", 1)]), "COD"))
            .await
            .unwrap();
        service
            .submit(UserId::new(2), input(json!([line(3, "C", "1", 1)]), "COD"))
            .await
            .unwrap();

        let ids: Vec<_> = service.list(USER).await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first, second]);
        assert!(service.list(UserId::new(3)).await.unwrap().is_empty());
    }
}
