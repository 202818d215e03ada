//! `PostgreSQL` catalog storage.

use async_trait::async_trait;
use sqlx::PgPool;

use playtech_core::{NewProduct, Product, ProductId};

use super::{ProductStore, RepositoryError};

const PRODUCT_COLUMNS: &str = "id, name, category, description, old_price, new_price, image_url";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: String,
    description: String,
    old_price: String,
    new_price: String,
    image_url: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            old_price: row.old_price.into(),
            new_price: row.new_price.into(),
            image_url: row.image_url,
        }
    }
}

/// Catalog storage backed by the `products` table.
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(raw)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO products (name, category, description, old_price, new_price, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.description)
            .bind(product.old_price.as_str())
            .bind(product.new_price.as_str())
            .bind(&product.image_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }
}
