//! Business logic, one service per area.
//!
//! Services borrow what they need from [`AppState`](crate::state::AppState)
//! and are built per request.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod orders;
pub mod token;
