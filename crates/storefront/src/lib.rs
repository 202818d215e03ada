//! PlayTech Storefront library.
//!
//! JSON API for accounts, the product catalog, per-user carts and orders.
//! The binary in `main.rs` wires this library to `PostgreSQL`, SMTP and the
//! network; tests drive the same router over in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
