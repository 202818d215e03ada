//! Cart service.
//!
//! Every write re-reads the cart, applies the mutation and saves it with a
//! version check. If another request saved in between, the mutation is
//! re-applied to the fresh copy, up to [`MAX_ATTEMPTS`] times.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use playtech_core::{Cart, CartId, LineItemId, Product, ProductId, Quantity, UserId};

use crate::db::{CartStore, ProductStore, RepositoryError};
use crate::state::AppState;

/// Attempts per write before giving up on a contended cart.
pub const MAX_ATTEMPTS: u32 = 3;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Missing required fields.")]
    MissingFields,

    #[error("Invalid quantity.")]
    InvalidQuantity,

    #[error("Product not found.")]
    ProductNotFound,

    #[error("Item not found.")]
    ItemNotFound,

    #[error("Cart not found.")]
    CartNotFound,

    /// Every attempt lost the version race.
    #[error("cart changed concurrently {0} times in a row")]
    Contended(u32),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Add-to-cart request body.
///
/// Both fields stay untyped so missing and malformed values map to the
/// right error instead of a generic JSON rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddItemInput {
    pub product_id: Option<Value>,
    pub quantity: Option<Value>,
}

/// Update-quantity request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateItemInput {
    pub quantity: Option<Value>,
}

/// A cart line with its product resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: LineItemId,
    /// `None` if the product has since left the catalog.
    #[serde(rename = "productId")]
    pub product: Option<Product>,
    pub quantity: Quantity,
}

/// What the caller's cart looks like right now.
#[derive(Debug, Clone)]
pub enum CartView {
    /// The user has never had a cart, or it was cleared.
    Absent,
    Items(Vec<CartLineView>),
}

/// Cart operations for one user at a time.
pub struct CartService<'a> {
    carts: &'a dyn CartStore,
    products: &'a dyn ProductStore,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            carts: state.stores().carts.as_ref(),
            products: state.stores().products.as_ref(),
        }
    }

    /// The user's cart with products joined in.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn fetch(&self, user_id: UserId) -> Result<CartView, CartError> {
        let Some(cart) = self.carts.find_by_user(user_id).await? else {
            return Ok(CartView::Absent);
        };

        let ids: Vec<ProductId> = cart.items.iter().map(|line| line.product_id).collect();
        let products = self.products.get_many(&ids).await?;

        let lines = cart
            .items
            .into_iter()
            .map(|line| CartLineView {
                id: line.id,
                product: products.iter().find(|p| p.id == line.product_id).cloned(),
                quantity: line.quantity,
            })
            .collect();
        Ok(CartView::Items(lines))
    }

    /// Add a product, merging into an existing line for the same product.
    ///
    /// Creates the cart if the user has none. `quantity` defaults to 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingFields` without a product, `InvalidQuantity`
    /// for a quantity below 1 and `ProductNotFound` for an unknown product.
    #[instrument(skip(self, input))]
    pub async fn add_item(&self, user_id: UserId, input: AddItemInput) -> Result<Cart, CartError> {
        let product_id = parse_product_ref(input.product_id.as_ref())?;
        let quantity = match input.quantity {
            None | Some(Value::Null) => Quantity::ONE,
            Some(value) => Quantity::from_json(&value).map_err(|_| CartError::InvalidQuantity)?,
        };

        if self.products.get(product_id).await?.is_none() {
            return Err(CartError::ProductNotFound);
        }

        let (cart, line) = self
            .mutate(user_id, true, |cart| {
                Ok(cart.add_item(product_id, quantity))
            })
            .await?;
        tracing::info!(%product_id, line_id = %line, "Item added to cart");
        Ok(cart)
    }

    /// Overwrite the quantity of one line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` unless `quantity` is a positive
    /// integer and `ItemNotFound` if there is no cart or no such line.
    #[instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        item_id: &str,
        input: UpdateItemInput,
    ) -> Result<Cart, CartError> {
        let quantity = input
            .quantity
            .as_ref()
            .ok_or(CartError::InvalidQuantity)
            .and_then(|v| Quantity::from_json(v).map_err(|_| CartError::InvalidQuantity))?;
        let line_id = item_id
            .parse::<LineItemId>()
            .map_err(|_| CartError::ItemNotFound)?;

        let (cart, ()) = self
            .mutate(user_id, false, |cart| {
                cart.set_quantity(line_id, quantity)
                    .map_err(|_| CartError::ItemNotFound)
            })
            .await
            .map_err(|e| match e {
                CartError::CartNotFound => CartError::ItemNotFound,
                other => other,
            })?;
        Ok(cart)
    }

    /// Remove one line. Removing an id that is not in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::MissingFields` for an empty id and `CartNotFound`
    /// if the user has no cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: UserId, item_id: &str) -> Result<Cart, CartError> {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            return Err(CartError::MissingFields);
        }
        // An id that is not even a UUID cannot name a line; treat it as absent.
        let line_id = item_id.parse::<LineItemId>().ok();

        let (cart, removed) = self
            .mutate(user_id, false, |cart| {
                Ok(line_id.is_some_and(|id| cart.remove_item(id)))
            })
            .await?;
        tracing::debug!(removed, "Cart item removal");
        Ok(cart)
    }

    /// Delete the cart entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        if self.carts.delete_by_user(user_id).await? {
            Ok(())
        } else {
            Err(CartError::CartNotFound)
        }
    }

    /// Apply `apply` to the user's cart and save it with a version check.
    ///
    /// With `create_if_missing`, a user without a cart gets a new one holding
    /// the result of applying the mutation to an empty cart, including when
    /// the cart is deleted between the read and the save. A mutation that
    /// leaves the lines untouched is not written.
    async fn mutate<T, F>(
        &self,
        user_id: UserId,
        create_if_missing: bool,
        mut apply: F,
    ) -> Result<(Cart, T), CartError>
    where
        F: FnMut(&mut Cart) -> Result<T, CartError> + Send,
        T: Send,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let existing = self.carts.find_by_user(user_id).await?;
            let result = match existing {
                Some(mut cart) => {
                    let before = cart.items.clone();
                    let out = apply(&mut cart)?;
                    if cart.items == before {
                        return Ok((cart, out));
                    }
                    self.carts.save(&cart).await.map(|saved| (saved, out))
                }
                None if create_if_missing => {
                    let mut cart = Cart {
                        id: CartId::new(0),
                        user_id,
                        items: Vec::new(),
                        version: 0,
                    };
                    let out = apply(&mut cart)?;
                    self.carts
                        .create(user_id, cart.items)
                        .await
                        .map(|created| (created, out))
                }
                None => return Err(CartError::CartNotFound),
            };

            match result {
                Ok(done) => return Ok(done),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::debug!(attempt, "Cart write lost a race, re-applying");
                }
                Err(RepositoryError::NotFound) if create_if_missing => {
                    tracing::debug!(attempt, "Cart deleted before save, recreating");
                }
                Err(RepositoryError::NotFound) => return Err(CartError::CartNotFound),
                Err(e) => return Err(e.into()),
            }
        }

        tracing::warn!(%user_id, "Cart write abandoned after repeated conflicts");
        Err(CartError::Contended(MAX_ATTEMPTS))
    }
}

/// Read a product reference given as a JSON number or numeric string.
fn parse_product_ref(value: Option<&Value>) -> Result<ProductId, CartError> {
    match value {
        None | Some(Value::Null) => Err(CartError::MissingFields),
        Some(Value::String(s)) if s.trim().is_empty() => Err(CartError::MissingFields),
        Some(Value::String(s)) => s.parse().map_err(|_| CartError::ProductNotFound),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(ProductId::new)
            .ok_or(CartError::ProductNotFound),
        Some(_) => Err(CartError::ProductNotFound),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use playtech_core::{LineItem, NewProduct};

    use super::*;
    use crate::db::Stores;
    use crate::db::memory::MemoryCartStore;
    use crate::state::{test_state, test_state_with_stores};

    async fn product(state: &AppState, name: &str) -> Product {
        state
            .stores()
            .products
            .create(NewProduct {
                name: name.to_string(),
                new_price: "10".into(),
                ..NewProduct::default()
            })
            .await
            .unwrap()
    }

    fn add(product: &Product, quantity: Value) -> AddItemInput {
        AddItemInput {
            product_id: Some(json!(product.id)),
            quantity: Some(quantity),
        }
    }

    const USER: UserId = UserId::new(1);

    #[tokio::test]
    async fn test_fetch_without_cart_is_absent() {
        let (state, _) = test_state();
        let view = CartService::new(&state).fetch(USER).await.unwrap();
        assert!(matches!(view, CartView::Absent));
    }

    #[tokio::test]
    async fn test_fetch_empty_cart_is_not_absent() {
        let (state, _) = test_state();
        state.stores().carts.ensure(USER).await.unwrap();

        let view = CartService::new(&state).fetch(USER).await.unwrap();
        assert!(matches!(view, CartView::Items(ref lines) if lines.is_empty()));
    }

    #[tokio::test]
    async fn test_adding_same_product_twice_sums_quantities() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;

        service.add_item(USER, add(&ps5, json!(1))).await.unwrap();
        let cart = service.add_item(USER, add(&ps5, json!(2))).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity.get(), 3);
    }

    #[tokio::test]
    async fn test_add_accepts_string_product_id_and_defaults_quantity() {
        let (state, _) = test_state();
        let ps5 = product(&state, "PS5").await;

        let cart = CartService::new(&state)
            .add_item(
                USER,
                AddItemInput {
                    product_id: Some(json!(ps5.id.to_string())),
                    quantity: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(cart.items[0].quantity, Quantity::ONE);
    }

    #[tokio::test]
    async fn test_add_validation() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;

        let missing = service
            .add_item(USER, AddItemInput::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, CartError::MissingFields));

        let zero = service.add_item(USER, add(&ps5, json!(0))).await.unwrap_err();
        assert!(matches!(zero, CartError::InvalidQuantity));

        let unknown = service
            .add_item(
                USER,
                AddItemInput {
                    product_id: Some(json!(999)),
                    quantity: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(unknown, CartError::ProductNotFound));

        assert!(state.stores().carts.find_by_user(USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_resolves_products_and_tolerates_missing_ones() {
        let (state, _) = test_state();
        let ps5 = product(&state, "PS5").await;
        state
            .stores()
            .carts
            .create(
                USER,
                vec![
                    LineItem::new(ps5.id, Quantity::ONE),
                    LineItem::new(ProductId::new(404), Quantity::ONE),
                ],
            )
            .await
            .unwrap();

        let CartView::Items(lines) = CartService::new(&state).fetch(USER).await.unwrap() else {
            panic!("expected items");
        };
        assert_eq!(lines[0].product.as_ref().unwrap().name, "PS5");
        assert!(lines[1].product.is_none());
    }

    #[tokio::test]
    async fn test_update_sets_absolute_quantity() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;
        let cart = service.add_item(USER, add(&ps5, json!(4))).await.unwrap();
        let line = cart.items[0].id;

        let cart = service
            .update_item(
                USER,
                &line.to_string(),
                UpdateItemInput {
                    quantity: Some(json!(2)),
                },
            )
            .await
            .unwrap();
        assert_eq!(cart.items[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let some_line = LineItemId::generate().to_string();
        let two = || UpdateItemInput {
            quantity: Some(json!(2)),
        };

        let no_cart = service.update_item(USER, &some_line, two()).await.unwrap_err();
        assert!(matches!(no_cart, CartError::ItemNotFound));

        let ps5 = product(&state, "PS5").await;
        service.add_item(USER, add(&ps5, json!(1))).await.unwrap();
        let unknown = service.update_item(USER, &some_line, two()).await.unwrap_err();
        assert!(matches!(unknown, CartError::ItemNotFound));

        for bad in [json!(null), json!("2"), json!(0), json!(1.5)] {
            let err = service
                .update_item(
                    USER,
                    &some_line,
                    UpdateItemInput {
                        quantity: Some(bad),
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity));
        }
    }

    #[tokio::test]
    async fn test_remove_unknown_line_is_silent_noop() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;
        let before = service.add_item(USER, add(&ps5, json!(1))).await.unwrap();

        let after = service
            .remove_item(USER, &LineItemId::generate().to_string())
            .await
            .unwrap();
        assert_eq!(after.items, before.items);

        let garbage = service.remove_item(USER, "not-a-line").await.unwrap();
        assert_eq!(garbage.items, before.items);
    }

    #[tokio::test]
    async fn test_remove_unknown_line_does_not_write() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;
        let before = service.add_item(USER, add(&ps5, json!(1))).await.unwrap();

        let after = service
            .remove_item(USER, &LineItemId::generate().to_string())
            .await
            .unwrap();
        assert_eq!(after.version, before.version);

        let stored = state.stores().carts.find_by_user(USER).await.unwrap().unwrap();
        assert_eq!(stored.version, before.version);
    }

    #[tokio::test]
    async fn test_remove_errors() {
        let (state, _) = test_state();
        let service = CartService::new(&state);

        let empty = service.remove_item(USER, " ").await.unwrap_err();
        assert!(matches!(empty, CartError::MissingFields));

        let no_cart = service
            .remove_item(USER, &LineItemId::generate().to_string())
            .await
            .unwrap_err();
        assert!(matches!(no_cart, CartError::CartNotFound));
    }

    #[tokio::test]
    async fn test_remove_known_line() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;
        let cart = service.add_item(USER, add(&ps5, json!(1))).await.unwrap();

        let cart = service
            .remove_item(USER, &cart.items[0].id.to_string())
            .await
            .unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let (state, _) = test_state();
        let service = CartService::new(&state);
        let ps5 = product(&state, "PS5").await;
        service.add_item(USER, add(&ps5, json!(1))).await.unwrap();

        service.clear(USER).await.unwrap();
        assert!(matches!(service.fetch(USER).await.unwrap(), CartView::Absent));
        assert!(matches!(
            service.clear(USER).await.unwrap_err(),
            CartError::CartNotFound
        ));
    }

    /// A cart store where another writer sneaks in before the first
    /// `conflicts` saves.
    struct RacingCartStore {
        inner: MemoryCartStore,
        conflicts: AtomicU32,
        rival: ProductId,
    }

    #[async_trait]
    impl CartStore for RacingCartStore {
        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            self.inner.find_by_user(user_id).await
        }

        async fn create(
            &self,
            user_id: UserId,
            items: Vec<LineItem>,
        ) -> Result<Cart, RepositoryError> {
            self.inner.create(user_id, items).await
        }

        async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
            self.inner.ensure(user_id).await
        }

        async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                let mut rival = self.inner.find_by_user(cart.user_id).await?.unwrap();
                rival.add_item(self.rival, Quantity::ONE);
                self.inner.save(&rival).await?;
            }
            self.inner.save(cart).await
        }

        async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
            self.inner.delete_by_user(user_id).await
        }
    }

    async fn racing_state(conflicts: u32) -> (AppState, Product, Product) {
        let mut stores = Stores::in_memory();
        let sample = |name: &str| NewProduct {
            name: name.to_string(),
            new_price: "10".into(),
            ..NewProduct::default()
        };
        let ps5 = stores.products.create(sample("PS5")).await.unwrap();
        let xbox = stores.products.create(sample("Xbox")).await.unwrap();

        stores.carts = Arc::new(RacingCartStore {
            inner: MemoryCartStore::default(),
            conflicts: AtomicU32::new(conflicts),
            rival: xbox.id,
        });
        let state = test_state_with_stores(stores);
        state.stores().carts.ensure(USER).await.unwrap();
        (state, ps5, xbox)
    }

    #[tokio::test]
    async fn test_concurrent_write_is_reapplied_not_lost() {
        let (state, ps5, xbox) = racing_state(1).await;

        let cart = CartService::new(&state)
            .add_item(USER, add(&ps5, json!(1)))
            .await
            .unwrap();

        // Both the rival's line and ours survive.
        let products: Vec<_> = cart.items.iter().map(|l| l.product_id).collect();
        assert!(products.contains(&ps5.id));
        assert!(products.contains(&xbox.id));
    }

    #[tokio::test]
    async fn test_persistent_contention_gives_up() {
        let (state, ps5, _) = racing_state(MAX_ATTEMPTS).await;

        let err = CartService::new(&state)
            .add_item(USER, add(&ps5, json!(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Contended(MAX_ATTEMPTS)));
    }

    /// A cart store where a concurrent `clearCart` deletes the cart right
    /// before the first save.
    struct ClearingCartStore {
        inner: MemoryCartStore,
        cleared: AtomicBool,
    }

    #[async_trait]
    impl CartStore for ClearingCartStore {
        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            self.inner.find_by_user(user_id).await
        }

        async fn create(
            &self,
            user_id: UserId,
            items: Vec<LineItem>,
        ) -> Result<Cart, RepositoryError> {
            self.inner.create(user_id, items).await
        }

        async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
            self.inner.ensure(user_id).await
        }

        async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
            if !self.cleared.swap(true, Ordering::SeqCst) {
                self.inner.delete_by_user(cart.user_id).await?;
            }
            self.inner.save(cart).await
        }

        async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
            self.inner.delete_by_user(user_id).await
        }
    }

    async fn clearing_state() -> (AppState, Product) {
        let mut stores = Stores::in_memory();
        let ps5 = stores
            .products
            .create(NewProduct {
                name: "PS5".to_string(),
                new_price: "10".into(),
                ..NewProduct::default()
            })
            .await
            .unwrap();
        stores.carts = Arc::new(ClearingCartStore {
            inner: MemoryCartStore::default(),
            cleared: AtomicBool::new(false),
        });
        let state = test_state_with_stores(stores);
        state.stores().carts.ensure(USER).await.unwrap();
        (state, ps5)
    }

    #[tokio::test]
    async fn test_add_recreates_cart_cleared_before_save() {
        let (state, ps5) = clearing_state().await;

        let cart = CartService::new(&state)
            .add_item(USER, add(&ps5, json!(2)))
            .await
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, ps5.id);
        assert_eq!(cart.items[0].quantity.get(), 2);
        let stored = state.stores().carts.find_by_user(USER).await.unwrap().unwrap();
        assert_eq!(stored.id, cart.id);
    }

    #[tokio::test]
    async fn test_update_of_cart_cleared_before_save_is_not_found() {
        let (state, ps5) = clearing_state().await;
        let carts = &state.stores().carts;
        carts.delete_by_user(USER).await.unwrap();
        let item = LineItem::new(ps5.id, Quantity::ONE);
        let line = item.id;
        carts.create(USER, vec![item]).await.unwrap();

        let err = CartService::new(&state)
            .update_item(
                USER,
                &line.to_string(),
                UpdateItemInput {
                    quantity: Some(json!(5)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound));
    }

    /// A cart store where another request creates the user's cart between
    /// our read and our insert.
    struct CreateRaceCartStore {
        inner: MemoryCartStore,
        rival_cart: Mutex<Option<CartId>>,
        rival: ProductId,
    }

    #[async_trait]
    impl CartStore for CreateRaceCartStore {
        async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
            self.inner.find_by_user(user_id).await
        }

        async fn create(
            &self,
            user_id: UserId,
            items: Vec<LineItem>,
        ) -> Result<Cart, RepositoryError> {
            if self.rival_cart.lock().unwrap().is_none() {
                let rival = self
                    .inner
                    .create(user_id, vec![LineItem::new(self.rival, Quantity::ONE)])
                    .await?;
                *self.rival_cart.lock().unwrap() = Some(rival.id);
            }
            self.inner.create(user_id, items).await
        }

        async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
            self.inner.ensure(user_id).await
        }

        async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
            self.inner.save(cart).await
        }

        async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
            self.inner.delete_by_user(user_id).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_cart_creation_merges_into_winner() {
        let mut stores = Stores::in_memory();
        let sample = |name: &str| NewProduct {
            name: name.to_string(),
            new_price: "10".into(),
            ..NewProduct::default()
        };
        let ps5 = stores.products.create(sample("PS5")).await.unwrap();
        let xbox = stores.products.create(sample("Xbox")).await.unwrap();
        let racing = Arc::new(CreateRaceCartStore {
            inner: MemoryCartStore::default(),
            rival_cart: Mutex::new(None),
            rival: xbox.id,
        });
        stores.carts = racing.clone();
        let state = test_state_with_stores(stores);

        let cart = CartService::new(&state)
            .add_item(USER, add(&ps5, json!(1)))
            .await
            .unwrap();

        let products: Vec<_> = cart.items.iter().map(|l| l.product_id).collect();
        assert_eq!(products, vec![xbox.id, ps5.id]);

        // Our line went into the winner's cart; no second cart was made.
        let rival_cart = racing.rival_cart.lock().unwrap().unwrap();
        assert_eq!(cart.id, rival_cart);
        let stored = state.stores().carts.find_by_user(USER).await.unwrap().unwrap();
        assert_eq!(stored.id, rival_cart);
        assert_eq!(stored.items, cart.items);
        assert_eq!(stored.version, 1);
    }
}
