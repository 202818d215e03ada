//! Core types for PlayTech.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod quantity;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::DisplayPrice;
pub use quantity::{Quantity, QuantityError};
pub use role::{Role, RoleParseError};
