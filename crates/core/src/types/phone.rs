//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input is not exactly ten ASCII digits.
    #[error("phone number must be exactly {len} digits")]
    InvalidFormat {
        /// Required number of digits.
        len: usize,
    },
}

/// A ten-digit phone number.
///
/// No country code, separators, or spaces are accepted; the value is stored
/// exactly as the ten digits.
///
/// ```
/// use playtech_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("9876543210").is_ok());
/// assert!(PhoneNumber::parse("98765-43210").is_err());
/// assert!(PhoneNumber::parse("987654321").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Required number of digits.
    pub const LENGTH: usize = 10;

    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneNumberError::InvalidFormat`] unless the input is exactly
    /// ten ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.len() == Self::LENGTH && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PhoneNumberError::InvalidFormat { len: Self::LENGTH })
        }
    }

    /// Returns the digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
