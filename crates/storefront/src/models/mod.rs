//! Domain models for the storefront.
//!
//! Types here are owned by the storefront rather than `playtech-core` because
//! they carry secrets (password hashes, reset tokens) that never leave the
//! service.

pub mod session;
pub mod user;

pub use session::{CurrentUser, SESSION_COOKIE};
pub use user::{NewUser, PublicUser, User};
