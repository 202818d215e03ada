//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready          - Liveness and readiness probes
//!
//! # Accounts (credential endpoints are rate limited)
//! POST /api/signup
//! POST /api/login
//! POST /api/logout                     (auth)
//! POST /api/forgetpassword
//! POST /api/resetpassword/{token}
//! GET  /api/checkLoggedIn              (auth)
//! GET  /api/checkUserRole              (auth)
//! POST /api/setAdminRole/{username}    (auth, admin)
//!
//! # Profile
//! GET  /api/user/details               (auth)
//! PUT  /api/user/update-name           (auth)
//! PUT  /api/user/update-phone-number   (auth)
//! PUT  /api/user/change-password       (auth)
//!
//! # Catalog
//! GET  /auth/api/products
//! POST /auth/api/products
//!
//! # Cart
//! GET    /auth/user/cart               (auth)
//! POST   /auth/user/cart/add           (auth)
//! PUT    /auth/user/cart/update/{itemId} (auth)
//! DELETE /auth/user/cart/remove/{itemId} (auth)
//! DELETE /auth/user/cart/clearCart     (auth)
//!
//! # Orders
//! GET  /api/orders                     (auth)
//! POST /api/orders                     (auth)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    extract::FromRequest,
    routing::{delete, get, post, put},
};

use crate::error::AppError;
use crate::middleware::credential_rate_limiter;
use crate::state::AppState;

/// JSON body extractor whose rejection is a `{"error": ...}` validation error.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Endpoints that accept credentials or send mail.
fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/forgetpassword", post(auth::forgot_password))
        .route("/api/resetpassword/{token}", post(auth::reset_password))
}

/// Create the account routes router.
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/checkLoggedIn", get(auth::check_logged_in))
        .route("/checkUserRole", get(auth::check_user_role))
        .route("/setAdminRole/{username}", post(auth::set_admin_role))
        .route("/user/details", get(account::details))
        .route("/user/update-name", put(account::update_name))
        .route("/user/update-phone-number", put(account::update_phone_number))
        .route("/user/change-password", put(account::change_password))
        .route("/orders", get(orders::index).post(orders::create))
}

/// Create the cart routes router.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/user/cart", get(cart::show))
        .route("/auth/user/cart/add", post(cart::add))
        .route("/auth/user/cart/update/{item_id}", put(cart::update))
        .route("/auth/user/cart/remove/{item_id}", delete(cart::remove))
        .route("/auth/user/cart/clearCart", delete(cart::clear))
}

fn assemble(credentials: Router<AppState>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(credentials)
        .nest("/api", account_routes())
        .route("/auth/api/products", get(products::index).post(products::create))
        .merge(cart_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    assemble(credential_routes())
}

/// All routes, with the credential endpoints behind the IP rate limiter.
///
/// The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the limiter can
/// key on the peer address when no proxy header is present.
pub fn rate_limited_routes() -> Router<AppState> {
    assemble(credential_routes().layer(credential_rate_limiter()))
}
