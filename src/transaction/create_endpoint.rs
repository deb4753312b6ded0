//! The endpoint for recording a new transaction.

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::{Account, AccountStore},
    auth::AccessToken,
    backend::{BackendClient, NewTransaction},
    endpoints,
    money::{Currency, parse_major},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState<A: AccountStore> {
    /// The client for the ledger API.
    pub backend: BackendClient,
    /// The store for account data, used to validate the selected accounts.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for CreateTransactionState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
            account_store: state.account_store.clone(),
        }
    }
}

/// The form data for recording a transaction.
#[derive(Debug, Deserialize)]
pub struct NewTransactionForm {
    /// The kind label.
    pub kind: String,
    /// A free-form description, empty for none.
    pub description: Option<String>,
    /// The amount in major units. Must be non-zero.
    pub amount: String,
    /// The paying account ID, empty for none.
    pub account_from: Option<String>,
    /// The receiving account ID, empty for none.
    pub account_to: Option<String>,
    /// Metadata as JSON, empty for none.
    pub meta: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn resolve_account<'a>(accounts: &'a [Account], account_id: &str) -> Result<&'a Account, Error> {
    accounts
        .iter()
        .find(|account| account.id == account_id)
        .ok_or_else(|| Error::AccountNotFound(account_id.to_owned()))
}

/// The currency the transaction amount is stated in.
///
/// Both selected accounts must agree on it; a one-sided transaction uses
/// that side's currency. The ledger API has no conversion step on the write
/// path, so mixed currencies are rejected here.
fn shared_currency(
    from: Option<&Account>,
    to: Option<&Account>,
) -> Result<Currency, Error> {
    match (from, to) {
        (Some(from), Some(to)) if from.base_currency != to.base_currency => {
            Err(Error::CurrencyConflict)
        }
        (Some(account), _) | (None, Some(account)) => Ok(account.base_currency),
        (None, None) => Err(Error::MissingAccountSelection),
    }
}

/// Record a transaction with the ledger API and redirect to the transactions
/// page.
pub async fn create_transaction<A: AccountStore>(
    State(state): State<CreateTransactionState<A>>,
    Extension(token): Extension<AccessToken>,
    Form(form): Form<NewTransactionForm>,
) -> Response {
    let account_from = non_empty(form.account_from);
    let account_to = non_empty(form.account_to);
    if account_from.is_none() && account_to.is_none() {
        return Error::MissingAccountSelection.into_alert_response();
    }

    let meta = match non_empty(form.meta) {
        Some(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Some(value),
            Err(error) => return Error::InvalidMeta(error.to_string()).into_alert_response(),
        },
        None => None,
    };

    let accounts = match state.account_store.list(&token).await {
        Ok(accounts) => accounts,
        Err(error) => return error.into_alert_response(),
    };

    let from = match &account_from {
        Some(id) => match resolve_account(&accounts, id) {
            Ok(account) => Some(account),
            Err(error) => return error.into_alert_response(),
        },
        None => None,
    };
    let to = match &account_to {
        Some(id) => match resolve_account(&accounts, id) {
            Ok(account) => Some(account),
            Err(error) => return error.into_alert_response(),
        },
        None => None,
    };

    let currency = match shared_currency(from, to) {
        Ok(currency) => currency,
        Err(error) => return error.into_alert_response(),
    };

    let amount_minor = match parse_major(&form.amount, currency) {
        Ok(0) => return Error::InvalidAmount(form.amount).into_alert_response(),
        Ok(amount_minor) => match amount_minor.checked_abs() {
            Some(amount_minor) => amount_minor,
            None => return Error::InvalidAmount(form.amount).into_alert_response(),
        },
        Err(error) => return error.into_alert_response(),
    };

    let new_transaction = NewTransaction {
        kind: form.kind,
        description: non_empty(form.description),
        meta,
        account_from,
        account_to,
        amount_minor,
    };

    if let Err(error) = state
        .backend
        .create_transaction(&token, &new_transaction)
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

#[cfg(test)]
mod create_transaction_tests {
    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;

    use crate::{
        account::{
            Account, AccountKind, AccountStatus, InMemoryAccountStore,
        },
        auth::AccessToken,
        backend::BackendClient,
        endpoints,
        money::Currency,
    };

    use super::{CreateTransactionState, create_transaction};

    fn account(id: &str, currency: Currency) -> Account {
        Account {
            id: id.to_owned(),
            institution_id: None,
            name: id.to_owned(),
            kind: AccountKind::Asset,
            account_type: None,
            base_currency: currency,
            number_full: None,
            number_masked: None,
            credit_limit_minor: None,
            balance_minor: 0,
            status: AccountStatus::Active,
            meta: serde_json::Value::Null,
        }
    }

    fn get_test_server(accounts: Vec<Account>) -> TestServer {
        let state = CreateTransactionState {
            // Port 9 (discard) is never listening in the test environment.
            backend: BackendClient::new("http://127.0.0.1:9"),
            account_store: InMemoryAccountStore::with_accounts(accounts),
        };

        let app = Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(create_transaction::<InMemoryAccountStore>),
            )
            .layer(Extension(AccessToken("test-token".to_owned())))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn no_account_selected_returns_alert() {
        let server = get_test_server(Vec::new());
        let form = [
            ("kind", "expense"),
            ("amount", "10"),
            ("account_from", ""),
            ("account_to", ""),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("No account selected");
    }

    #[tokio::test]
    async fn mixed_currencies_return_alert() {
        let server = get_test_server(vec![
            account("acct_1", Currency::Inr),
            account("acct_2", Currency::Usd),
        ]);
        let form = [
            ("kind", "transfer"),
            ("amount", "10"),
            ("account_from", "acct_1"),
            ("account_to", "acct_2"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Currency mismatch");
    }

    #[tokio::test]
    async fn zero_amount_returns_alert() {
        let server = get_test_server(vec![account("acct_1", Currency::Inr)]);
        let form = [
            ("kind", "expense"),
            ("amount", "0"),
            ("account_from", "acct_1"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Invalid amount");
    }

    #[tokio::test]
    async fn absurdly_large_amount_returns_alert() {
        let server = get_test_server(vec![account("acct_1", Currency::Inr)]);
        let form = [
            ("kind", "expense"),
            ("amount", "-99999999999999999999999"),
            ("account_from", "acct_1"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Invalid amount");
    }

    #[tokio::test]
    async fn unknown_account_returns_alert() {
        let server = get_test_server(vec![account("acct_1", Currency::Inr)]);
        let form = [
            ("kind", "expense"),
            ("amount", "10"),
            ("account_from", "acct_404"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_text_contains("Account not found");
    }

    #[tokio::test]
    async fn malformed_metadata_returns_alert() {
        let server = get_test_server(vec![account("acct_1", Currency::Inr)]);
        let form = [
            ("kind", "expense"),
            ("amount", "10"),
            ("account_from", "acct_1"),
            ("meta", "{not json"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Invalid metadata");
    }

    #[tokio::test]
    async fn valid_form_with_unreachable_ledger_api_returns_alert() {
        let server = get_test_server(vec![account("acct_1", Currency::Inr)]);
        let form = [
            ("kind", "expense"),
            ("amount", "10"),
            ("account_from", "acct_1"),
        ];

        let response = server.post(endpoints::TRANSACTIONS_API).form(&form).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_text_contains("Something went wrong");
    }
}
