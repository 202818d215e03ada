//! Product listings.

use serde::{Deserialize, Serialize};

use crate::types::{DisplayPrice, ProductId};

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub old_price: DisplayPrice,
    pub new_price: DisplayPrice,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Input for creating a product.
///
/// Every field is optional on the wire and defaults to an empty string;
/// the catalog performs no validation beyond JSON type coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub description: String,
    pub old_price: DisplayPrice,
    pub new_price: DisplayPrice,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl NewProduct {
    /// Attach the assigned ID, producing the stored product.
    #[must_use]
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            description: self.description,
            old_price: self.old_price,
            new_price: self.new_price,
            image_url: self.image_url,
        }
    }
}
