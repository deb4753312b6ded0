//! The endpoint for creating a new account.

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState,
    account::{AccountKind, AccountStore, AccountType},
    alert::Alert,
    auth::AccessToken,
    backend::NewAccount,
    endpoints,
    money::{Currency, parse_major},
};

/// The state needed for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState<A: AccountStore> {
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for CreateAccountState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            account_store: state.account_store.clone(),
        }
    }
}

/// The form data for creating an account.
#[derive(Debug, Deserialize)]
pub struct NewAccountForm {
    /// The display name.
    pub name: String,
    /// Asset or liability.
    pub kind: AccountKind,
    /// The product category.
    pub account_type: Option<AccountType>,
    /// The currency code for the account's balance.
    pub currency: String,
    /// The holding institution, empty for none.
    pub institution_id: Option<String>,
    /// The full account number, empty for none.
    pub number_full: Option<String>,
    /// The credit limit in major units, empty for none.
    pub credit_limit: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Create a new account with the ledger API and redirect to the accounts page.
///
/// Validation failures are returned as alert fragments so the form stays on
/// screen with the user's input intact.
pub async fn create_account<A: AccountStore>(
    State(state): State<CreateAccountState<A>>,
    Extension(token): Extension<AccessToken>,
    Form(form): Form<NewAccountForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Alert::error("Name required", "Give the account a name.").into_html(),
        )
            .into_response();
    }

    let currency = match Currency::from_code(&form.currency) {
        Ok(currency) => currency,
        Err(error) => return error.into_alert_response(),
    };

    let credit_limit_minor = match non_empty(form.credit_limit) {
        Some(raw) => match parse_major(&raw, currency) {
            Ok(amount_minor) => Some(amount_minor),
            Err(error) => return error.into_alert_response(),
        },
        None => None,
    };

    let new_account = NewAccount {
        name: form.name.trim().to_owned(),
        kind: form.kind,
        account_type: form.account_type,
        institution_id: non_empty(form.institution_id),
        currency,
        number_full: non_empty(form.number_full),
        credit_limit_minor,
    };

    if let Err(error) = state.account_store.create(&token, &new_account).await {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
