//! Defines the top level app state and how to create it.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    account::AccountStore, auth::DEFAULT_COOKIE_DURATION, backend::BackendClient,
    rates::RateClient,
};

/// The state of the application shared between all routes.
///
/// Generic over the account store so tests can swap the HTTP-backed store for
/// an in-memory one.
#[derive(Debug, Clone)]
pub struct AppState<A: AccountStore> {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The client for the ledger API that owns all financial data.
    pub backend: BackendClient,
    /// The client for the currency exchange rate provider.
    pub rates: RateClient,
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> AppState<A> {
    /// Create a new [AppState].
    ///
    /// `cookie_secret` is hashed to produce the cookie signing key, so any
    /// non-empty string works.
    pub fn new(
        cookie_secret: &str,
        backend: BackendClient,
        rates: RateClient,
        account_store: A,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            backend,
            rates,
            account_store,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl<A: AccountStore> FromRef<AppState<A>> for Key {
    fn from_ref(state: &AppState<A>) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive a cookie signing key from an arbitrary secret string.
///
/// `Key::from` panics if the slice is shorter than 64 bytes, so the secret is
/// stretched with SHA-512 first.
fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
