//! The endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{AppState, account::AccountStore, auth::AccessToken, backend::BackendClient, endpoints};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The client for the ledger API.
    pub backend: BackendClient,
}

impl<A: AccountStore> FromRef<AppState<A>> for DeleteTransactionState {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

/// Delete a transaction and redirect to the transactions page.
pub async fn delete_transaction(
    State(state): State<DeleteTransactionState>,
    Extension(token): Extension<AccessToken>,
    Path(transaction_id): Path<String>,
) -> Response {
    if let Err(error) = state
        .backend
        .delete_transaction(&token, &transaction_id)
        .await
    {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
