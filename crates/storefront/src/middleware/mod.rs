//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 4. Request ID
//! 5. Rate limiting on credential endpoints (governor)
//!
//! Authentication is not a layer: protected handlers take [`RequireUser`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::RequireUser;
pub use rate_limit::credential_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{removal_cookie, session_cookie};
