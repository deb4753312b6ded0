//! The endpoint for updating an account's stored balance.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::AccountStore,
    auth::AccessToken,
    endpoints,
    money::parse_major,
};

/// The state needed for updating an account.
#[derive(Debug, Clone)]
pub struct UpdateAccountState<A: AccountStore> {
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for UpdateAccountState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            account_store: state.account_store.clone(),
        }
    }
}

/// The form data for updating an account's balance.
#[derive(Debug, Deserialize)]
pub struct BalanceForm {
    /// The new balance in major units of the account's currency. Signed;
    /// liability balances are entered negative.
    pub balance: String,
}

/// Overwrite an account's stored balance and redirect to the accounts page.
pub async fn update_account<A: AccountStore>(
    State(state): State<UpdateAccountState<A>>,
    Extension(token): Extension<AccessToken>,
    Path(account_id): Path<String>,
    Form(form): Form<BalanceForm>,
) -> Response {
    let accounts = match state.account_store.list(&token).await {
        Ok(accounts) => accounts,
        Err(error) => return error.into_alert_response(),
    };

    let Some(account) = accounts.iter().find(|account| account.id == account_id) else {
        return Error::AccountNotFound(account_id).into_alert_response();
    };

    let balance_minor = match parse_major(&form.balance, account.base_currency) {
        Ok(amount_minor) => amount_minor,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = state
        .account_store
        .set_balance(&token, &account_id, balance_minor)
        .await
    {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
