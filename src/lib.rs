//! Centime is a web app for tracking accounts, institutions, and transactions
//! across multiple currencies.
//!
//! This library serves HTML pages directly and forwards all reads and writes
//! to an external ledger API; the only state kept here is the user's session
//! cookie. Exchange rates for display conversion come from a third-party rate
//! service and are never persisted.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod backend;
mod endpoints;
mod fx;
mod html;
mod institution;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod rates;
mod routing;
mod transaction;

pub use account::{AccountStore, HttpAccountStore, InMemoryAccountStore};
pub use app_state::AppState;
pub use backend::BackendClient;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use rates::RateClient;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookie is missing, or the ledger API rejected the bearer
    /// token it contained.
    ///
    /// This is the only error class that redirects the user to the log-in
    /// page instead of degrading in place.
    #[error("the session is missing or no longer valid")]
    Unauthorized,

    /// The session cookie could not be found in the cookie jar.
    #[error("no session cookie in the cookie jar")]
    CookieMissing,

    /// The user provided a username and password that the ledger API did not
    /// accept.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A request to the ledger API failed at the transport level or returned
    /// an unexpected status code.
    ///
    /// The string should only be logged for debugging on the server. Pages
    /// receiving this error should fall back to a degraded view rather than
    /// surfacing the detail to the client.
    #[error("ledger API request failed: {0}")]
    BackendRequest(String),

    /// The ledger API returned a payload that could not be deserialized.
    #[error("could not parse ledger API response: {0}")]
    MalformedResponse(String),

    /// The exchange-rate service failed, returned an unusable payload, or is
    /// missing a required rate.
    ///
    /// Callers must fall back to showing unconverted amounts or a neutral
    /// placeholder. This error is never retried automatically.
    #[error("exchange rates are unavailable")]
    RateUnavailable,

    /// A currency code from a form or external service is not one of the
    /// supported currencies.
    #[error("unsupported currency code \"{0}\"")]
    UnknownCurrency(String),

    /// A transaction was submitted between two accounts with different base
    /// currencies.
    ///
    /// The ledger API has no conversion step on the write path, so mixed
    /// currency transfers are rejected before they are forwarded.
    #[error("the selected accounts use different currencies")]
    CurrencyConflict,

    /// A monetary amount in a form could not be parsed, or was zero where a
    /// non-zero amount is required.
    #[error("\"{0}\" is not a valid non-zero amount")]
    InvalidAmount(String),

    /// A transaction was submitted with neither a from account nor a to
    /// account selected.
    #[error("at least one account must be selected")]
    MissingAccountSelection,

    /// The metadata field of a form did not contain valid JSON.
    #[error("metadata is not valid JSON: {0}")]
    InvalidMeta(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An account ID referenced an account that the ledger API does not know
    /// about.
    #[error("no account with the ID \"{0}\"")]
    AccountNotFound(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized | Error::CookieMissing => {
                Redirect::to(endpoints::LOG_IN_VIEW).into_response()
            }
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert fragment.
    ///
    /// Intended for endpoints called via HTMX where the alert is swapped into
    /// the page instead of replacing it.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::CurrencyConflict => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Currency mismatch".to_owned(),
                    details: "The from and to accounts use different currencies. \
                    Pick two accounts with the same base currency."
                        .to_owned(),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!("\"{amount}\" is not a valid non-zero amount."),
                },
            ),
            Error::MissingAccountSelection => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No account selected".to_owned(),
                    details: "Select at least one account (from or to).".to_owned(),
                },
            ),
            Error::InvalidMeta(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid metadata".to_owned(),
                    details: format!("The metadata field must be valid JSON: {details}."),
                },
            ),
            Error::UnknownCurrency(code) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unsupported currency".to_owned(),
                    details: format!("\"{code}\" is not a supported currency code."),
                },
            ),
            Error::AccountNotFound(id) => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Account not found".to_owned(),
                    details: format!(
                        "No account with the ID \"{id}\". \
                        Try refreshing the page to see if the account has been deleted."
                    ),
                },
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Alert::Error {
                    message: "Could not log in".to_owned(),
                    details: "Incorrect username or password.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
