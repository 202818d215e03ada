//! PlayTech Core - Shared domain types.
//!
//! This crate provides the types used across all PlayTech components:
//! - `storefront` - The HTTP backend (accounts, catalog, cart, orders)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and the invariants that govern them -
//! no I/O, no database access, no HTTP. Cart merge semantics and order
//! snapshotting live here so they can be tested without a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phone numbers, roles, prices, quantities
//! - [`catalog`] - Product listings
//! - [`cart`] - Per-user cart and its line-item invariants
//! - [`order`] - Immutable orders and cart snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{Cart, LineItem, LineItemNotFound};
pub use catalog::{NewProduct, Product};
pub use order::{NewOrder, Order, OrderItem, ProductSnapshot, SnapshotLine};
pub use types::*;
