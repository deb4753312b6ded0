//! Session handling backed by a private cookie.
//!
//! The app never stores credentials: log-in forwards them to the ledger API,
//! and the bearer token it returns is the only session state, held in an
//! encrypted cookie. The auth guard unpacks the token into a request
//! extension for route handlers.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;

pub use cookie::{
    AccessToken, DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie,
    set_auth_cookie,
};
pub use log_in::{LoginState, get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use redirect::normalize_redirect_url;

pub(crate) use redirect::build_log_in_redirect_url;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
