//! Session cookie construction.
//!
//! The session is a signed token in the `access_token` cookie. The cookie is
//! cross-site capable so a separately hosted frontend can send it.

use tower_sessions::cookie::{Cookie, SameSite, time::Duration};

use crate::models::SESSION_COOKIE;
use crate::services::token::SESSION_TTL;

/// Cookie carrying a freshly issued session token.
#[must_use]
pub fn session_cookie(token: &str) -> Cookie<'static> {
    base(token.to_owned())
        .max_age(Duration::seconds(SESSION_TTL.num_seconds()))
        .build()
}

/// Cookie that makes the browser drop the session cookie.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = base(String::new()).build();
    cookie.make_removal();
    cookie
}

fn base(value: String) -> tower_sessions::cookie::CookieBuilder<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
}
