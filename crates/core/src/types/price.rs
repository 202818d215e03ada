//! Display-string prices.
//!
//! Catalog prices are stored and served as the text the merchant entered
//! (e.g. `"₹49,999"` or `"1299.00"`). No arithmetic, sorting, or summing is
//! defined over them.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An opaque, display-formatted price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayPrice(String);

impl DisplayPrice {
    /// Wrap a display string as-is.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the display text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DisplayPrice {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for DisplayPrice {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}
