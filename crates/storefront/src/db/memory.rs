//! In-memory stores for unit and router tests.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use playtech_core::{
    Cart, CartId, Email, LineItem, NewOrder, NewProduct, Order, OrderId, PhoneNumber, Product,
    ProductId, Role, UserId,
};

use super::{CartStore, OrderStore, ProductStore, RepositoryError, UserStore};
use crate::models::{NewUser, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rows keyed by id plus the next id to assign.
struct Table<K, V> {
    rows: BTreeMap<K, V>,
    next_id: i32,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<K, V> Table<K, V> {
    const fn allocate(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<Table<UserId, User>>,
}

impl MemoryUserStore {
    fn update<R>(
        &self,
        id: UserId,
        f: impl FnOnce(&mut User) -> R,
    ) -> Result<R, RepositoryError> {
        let mut table = lock(&self.table);
        let user = table.rows.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        let out = f(user);
        user.updated_at = Utc::now();
        Ok(out)
    }

    fn find(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        lock(&self.table).rows.values().find(|u| pred(u)).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.table).rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.find(|u| u.username == username))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.find(|u| u.email == *email))
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self.find(|u| u.password_reset_token.as_deref() == Some(token_hash)))
    }

    async fn create(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut table = lock(&self.table);
        if table.rows.values().any(|u| u.email == new.email) {
            return Err(RepositoryError::Conflict("users_email_key".to_owned()));
        }
        if table.rows.values().any(|u| u.username == new.username) {
            return Err(RepositoryError::Conflict("users_username_key".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(table.allocate()),
            name: new.name,
            username: new.username,
            email: new.email,
            phone_number: None,
            role: Role::Customer,
            password_hash: new.password_hash,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        self.update(id, |u| {
            hash.clone_into(&mut u.password_hash);
            u.password_reset_token = None;
            u.password_reset_expires = None;
        })
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> Result<(), RepositoryError> {
        self.update(id, |u| {
            u.password_reset_token = token.map(|(hash, _)| hash.to_owned());
            u.password_reset_expires = token.map(|(_, expires)| expires);
        })
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), RepositoryError> {
        self.update(id, |u| u.role = role)
    }

    async fn set_name(&self, id: UserId, name: &str) -> Result<User, RepositoryError> {
        self.update(id, |u| {
            name.clone_into(&mut u.name);
            u.clone()
        })
    }

    async fn set_phone_number(
        &self,
        id: UserId,
        phone: &PhoneNumber,
    ) -> Result<User, RepositoryError> {
        self.update(id, |u| {
            u.phone_number = Some(phone.clone());
            u.clone()
        })
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    table: Mutex<Table<ProductId, Product>>,
}

impl MemoryProductStore {
    /// Overwrite a stored product, as an out-of-band catalog edit would.
    pub fn replace(&self, product: Product) {
        lock(&self.table).rows.insert(product.id, product);
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.table).rows.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(lock(&self.table).rows.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let table = lock(&self.table);
        Ok(ids
            .iter()
            .filter_map(|id| table.rows.get(id).cloned())
            .collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut table = lock(&self.table);
        let product = product.with_id(ProductId::new(table.allocate()));
        table.rows.insert(product.id, product.clone());
        Ok(product)
    }
}

#[derive(Default)]
pub struct MemoryCartStore {
    table: Mutex<Table<CartId, Cart>>,
}

impl MemoryCartStore {
    fn by_user(table: &Table<CartId, Cart>, user_id: UserId) -> Option<&Cart> {
        table.rows.values().find(|c| c.user_id == user_id)
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(Self::by_user(&lock(&self.table), user_id).cloned())
    }

    async fn create(
        &self,
        user_id: UserId,
        items: Vec<LineItem>,
    ) -> Result<Cart, RepositoryError> {
        let mut table = lock(&self.table);
        if Self::by_user(&table, user_id).is_some() {
            return Err(RepositoryError::Conflict("carts_user_id_key".to_owned()));
        }
        let cart = Cart {
            id: CartId::new(table.allocate()),
            user_id,
            items,
            version: 0,
        };
        table.rows.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.find_by_user(user_id).await? {
            return Ok(cart);
        }
        match self.create(user_id, Vec::new()).await {
            Err(RepositoryError::Conflict(_)) => self
                .find_by_user(user_id)
                .await?
                .ok_or(RepositoryError::NotFound),
            other => other,
        }
    }

    async fn save(&self, cart: &Cart) -> Result<Cart, RepositoryError> {
        let mut table = lock(&self.table);
        let stored = table.rows.get_mut(&cart.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != cart.version {
            return Err(RepositoryError::Conflict("stale cart version".to_owned()));
        }
        stored.items.clone_from(&cart.items);
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete_by_user(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut table = lock(&self.table);
        let before = table.rows.len();
        table.rows.retain(|_, c| c.user_id != user_id);
        Ok(table.rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    table: Mutex<Table<OrderId, Order>>,
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut table = lock(&self.table);
        let order = order.with_id(OrderId::new(table.allocate()));
        table.rows.insert(order.id, order.clone());
        Ok(order)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = lock(&self.table)
            .rows
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| (o.date, o.id));
        Ok(orders)
    }
}
