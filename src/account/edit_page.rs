//! The page for editing an account's stored balance.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    account::{Account, AccountStore},
    auth::AccessToken,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, centred_form,
        loading_spinner,
    },
    money::format_minor,
    navigation::NavBar,
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState<A: AccountStore> {
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for EditAccountPageState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            account_store: state.account_store.clone(),
        }
    }
}

/// Display the form for updating an account's stored balance.
///
/// The balance is edited in major units of the account's own currency;
/// display conversion never applies on the write path.
pub async fn get_edit_account_page<A: AccountStore>(
    State(state): State<EditAccountPageState<A>>,
    Extension(token): Extension<AccessToken>,
    Path(account_id): Path<String>,
) -> Response {
    let accounts = match state.account_store.list(&token).await {
        Ok(accounts) => accounts,
        Err(error) => return error.into_response(),
    };

    let Some(account) = accounts
        .into_iter()
        .find(|account| account.id == account_id)
    else {
        return Error::NotFound.into_response();
    };

    let form = edit_balance_form(&account);
    let content = html! {
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())
        (centred_form(&format!("Update {}", account.name), &form))
    };

    base("Edit Account", &content).into_response()
}

fn edit_balance_form(account: &Account) -> maud::Markup {
    // Strip the currency symbol so the field round-trips through parse_major.
    let current_balance = format_minor(account.balance_minor, account.base_currency)
        .replace(account.base_currency.symbol(), "");

    html! {
        form
            hx-patch=(endpoints::format_endpoint(endpoints::ACCOUNT_API, &account.id))
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="balance" class=(FORM_LABEL_STYLE)
                {
                    "Balance (" (account.base_currency.code()) ")"
                }

                input
                    type="text"
                    name="balance"
                    id="balance"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(current_balance);
            }

            button
                type="submit" id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Save"
            }
        }
    }
}

#[cfg(test)]
mod edit_account_page_tests {
    use axum::{Extension, Router, http::StatusCode, routing::get};
    use axum_test::TestServer;

    use crate::{
        account::{Account, AccountKind, AccountStatus, InMemoryAccountStore},
        auth::AccessToken,
        endpoints,
        money::Currency,
    };

    use super::{EditAccountPageState, get_edit_account_page};

    fn get_test_server(accounts: Vec<Account>) -> TestServer {
        let state = EditAccountPageState {
            account_store: InMemoryAccountStore::with_accounts(accounts),
        };

        let app = Router::new()
            .route(
                endpoints::EDIT_ACCOUNT_VIEW,
                get(get_edit_account_page::<InMemoryAccountStore>),
            )
            .layer(Extension(AccessToken("test-token".to_owned())))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn account(id: &str, balance_minor: i64) -> Account {
        Account {
            id: id.to_owned(),
            institution_id: None,
            name: "Everyday".to_owned(),
            kind: AccountKind::Asset,
            account_type: None,
            base_currency: Currency::Inr,
            number_full: None,
            number_masked: None,
            credit_limit_minor: None,
            balance_minor,
            status: AccountStatus::Active,
            meta: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn edit_page_prefills_current_balance() {
        let server = get_test_server(vec![account("acct_1", 500_000)]);

        let response = server
            .get(&endpoints::format_endpoint(
                endpoints::EDIT_ACCOUNT_VIEW,
                "acct_1",
            ))
            .await;

        response.assert_status_ok();
        let document = scraper::Html::parse_document(&response.text());
        let input_selector = scraper::Selector::parse("input[name=balance]").unwrap();
        let input = document
            .select(&input_selector)
            .next()
            .expect("expected a balance input");

        assert_eq!(input.value().attr("value"), Some("5,000.00"));
    }

    #[tokio::test]
    async fn edit_page_for_unknown_account_is_not_found() {
        let server = get_test_server(Vec::new());

        let response = server
            .get(&endpoints::format_endpoint(
                endpoints::EDIT_ACCOUNT_VIEW,
                "acct_404",
            ))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
