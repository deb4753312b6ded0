//! Defines functions for handling user authentication with cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::Error;

/// The bearer token issued by the ledger API at log-in.
///
/// Route handlers behind the auth guard receive this via
/// `Extension(token): Extension<AccessToken>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);

pub(crate) const COOKIE_TOKEN: &str = "access_token";

/// The default duration for which auth cookies are valid.
///
/// The ledger API expires its tokens on its own schedule; this only bounds
/// how long the browser keeps presenting the cookie.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::hours(1);

/// Add an auth cookie holding `token` to the cookie jar, indicating that a
/// user is logged in.
///
/// Sets the expiry of the cookie to `duration` from the current time. You can
/// use [DEFAULT_COOKIE_DURATION] for the default duration.
///
/// Returns the cookie jar with the cookie added.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    token: AccessToken,
    duration: Duration,
) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;

    jar.add(
        Cookie::build((COOKIE_TOKEN, token.0))
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Set the auth cookie to an invalid value and set its max age to zero, which
/// should delete the cookie on the client side.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

/// Extract the bearer token from the cookie jar.
///
/// # Errors
/// Returns [Error::CookieMissing] if there is no auth cookie. A cookie that
/// fails decryption never reaches this function; the jar drops it first.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<AccessToken, Error> {
    jar.get(COOKIE_TOKEN)
        .map(|cookie| AccessToken(cookie.value_trimmed().to_owned()))
        .ok_or(Error::CookieMissing)
}
