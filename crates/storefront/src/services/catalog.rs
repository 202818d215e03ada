//! Catalog service.

use tracing::instrument;

use playtech_core::{NewProduct, Product};

use crate::db::{ProductStore, RepositoryError};
use crate::state::AppState;

/// Catalog reads and writes. Products are never updated or deleted here.
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            products: state.stores().products.as_ref(),
        }
    }

    /// Every product, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list().await
    }

    /// Add a product exactly as given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self), fields(name = %product.name))]
    pub async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let product = self.products.create(product).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }
}
