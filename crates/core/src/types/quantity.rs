//! Line-item quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    Zero,
    /// The value does not fit in a `u32`.
    #[error("quantity is out of range")]
    OutOfRange,
    /// The value is not a whole number.
    #[error("quantity must be a whole number")]
    NotAnInteger,
}

/// A positive item count.
///
/// Every cart line and order line carries at least one unit; a zero or
/// negative count is rejected at construction instead of being stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit, the default for a new line.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Build a quantity from a count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for zero.
    pub fn new(count: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(count).map(Self).ok_or(QuantityError::Zero)
    }

    /// Read a quantity from an untyped JSON value.
    ///
    /// Only JSON numbers holding a positive integer are accepted; strings,
    /// floats with a fractional part, and negatives are rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] describing why the value was rejected.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, QuantityError> {
        let number = value.as_number().ok_or(QuantityError::NotAnInteger)?;
        if let Some(count) = number.as_u64() {
            let count = u32::try_from(count).map_err(|_| QuantityError::OutOfRange)?;
            return Self::new(count);
        }
        if number.as_i64().is_some() {
            return Err(QuantityError::Zero);
        }
        match number.as_f64() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= f64::from(u32::MAX) => {
                Self::new(f as u32)
            }
            _ => Err(QuantityError::NotAnInteger),
        }
    }

    /// Deserialize with the same rules as [`Quantity::from_json`].
    ///
    /// For `#[serde(deserialize_with)]` on client-supplied quantities, so a
    /// whole float such as `2.0` is accepted wherever the cart accepts it.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error for anything `from_json` rejects.
    pub fn deserialize_json<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }

    /// Get the count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}
