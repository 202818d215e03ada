//! Per-user cart and its line-item invariants.
//!
//! A user owns at most one cart. Within a cart there is at most one line per
//! product: adding a product that is already present increases that line's
//! quantity instead of appending a duplicate.

use serde::{Deserialize, Serialize};

use crate::types::{CartId, LineItemId, ProductId, Quantity, UserId};

/// Returned when a line item ID does not belong to the cart.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("line item {0} not found in cart")]
pub struct LineItemNotFound(pub LineItemId);

/// A single (product, quantity) entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl LineItem {
    /// Create a new line with a freshly generated ID.
    #[must_use]
    pub fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: LineItemId::generate(),
            product_id,
            quantity,
        }
    }
}

/// A user's cart.
///
/// `version` is the optimistic-concurrency counter maintained by the store:
/// a save only succeeds if nobody else saved since this copy was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    #[serde(skip)]
    pub version: i64,
}

impl Cart {
    /// Add `quantity` units of a product.
    ///
    /// Merges into the existing line for the product if there is one,
    /// otherwise appends a new line. Returns the ID of the affected line.
    pub fn add_item(&mut self, product_id: ProductId, quantity: Quantity) -> LineItemId {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return line.id;
        }

        let line = LineItem::new(product_id, quantity);
        let id = line.id;
        self.items.push(line);
        id
    }

    /// Overwrite the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemNotFound`] if no line has this ID.
    pub fn set_quantity(
        &mut self,
        line_id: LineItemId,
        quantity: Quantity,
    ) -> Result<(), LineItemNotFound> {
        let line = self
            .items
            .iter_mut()
            .find(|line| line.id == line_id)
            .ok_or(LineItemNotFound(line_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line. Removing an ID that is not present is a no-op.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove_item(&mut self, line_id: LineItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != line_id);
        self.items.len() != before
    }

    /// Look up a line by ID.
    #[must_use]
    pub fn line(&self, line_id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|line| line.id == line_id)
    }
}
