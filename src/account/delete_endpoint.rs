//! The endpoint for deleting an account.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{AppState, account::AccountStore, auth::AccessToken, endpoints};

/// The state needed for deleting an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState<A: AccountStore> {
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for DeleteAccountState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            account_store: state.account_store.clone(),
        }
    }
}

/// Delete an account and redirect to the accounts page.
pub async fn delete_account<A: AccountStore>(
    State(state): State<DeleteAccountState<A>>,
    Extension(token): Extension<AccessToken>,
    Path(account_id): Path<String>,
) -> Response {
    if let Err(error) = state.account_store.delete(&token, &account_id).await {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
