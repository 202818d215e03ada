//! Seed the catalog from a YAML file.
//!
//! The file is a list of products using the same field names as the HTTP
//! API:
//!
//! ```yaml
//! - name: PlayStation 5
//!   category: consoles
//!   description: Disc edition
//!   old_price: "54990"
//!   new_price: "49990"
//!   imageUrl: /images/ps5.png
//! ```

use std::path::Path;

use tracing::{info, warn};

use playtech_core::NewProduct;
use playtech_storefront::db::{PgProductStore, ProductStore};

/// Parse and check a YAML catalog.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or an entry has no name.
pub fn parse_catalog(content: &str) -> Result<Vec<NewProduct>, Box<dyn std::error::Error>> {
    let products: Vec<NewProduct> = serde_yaml::from_str(content)?;

    let unnamed: Vec<usize> = products
        .iter()
        .enumerate()
        .filter(|(_, p)| p.name.trim().is_empty())
        .map(|(i, _)| i)
        .collect();
    if !unnamed.is_empty() {
        return Err(format!("Products without a name at positions {unnamed:?}").into());
    }

    Ok(products)
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a database
/// operation fails.
pub async fn products(file_path: &str, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog = parse_catalog(&content)?;
    info!(products = catalog.len(), "Parsed catalog");

    if dry_run {
        warn!("Dry run, nothing written");
        return Ok(());
    }

    let store = PgProductStore::new(super::connect().await?);
    for product in catalog {
        let created = store.create(product).await?;
        info!(product_id = %created.id, name = %created.name, "Product inserted");
    }

    info!("Catalog seeding complete!");
    Ok(())
}
