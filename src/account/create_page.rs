//! The page for creating a new account.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState,
    account::{ACCOUNT_TYPES, AccountStore},
    auth::AccessToken,
    backend::BackendClient,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE, base,
        centred_form, loading_spinner,
    },
    institution::Institution,
    money::SUPPORTED_CURRENCIES,
    navigation::NavBar,
};

/// The state needed for the new account page.
#[derive(Debug, Clone)]
pub struct NewAccountPageState {
    /// The client for the ledger API, used to list institutions.
    pub backend: BackendClient,
}

impl<A: AccountStore> FromRef<AppState<A>> for NewAccountPageState {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

fn new_account_form(institutions: &[Institution]) -> Markup {
    html! {
        form
            hx-post=(endpoints::ACCOUNTS_API)
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                input
                    type="text"
                    name="name"
                    id="name"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus;
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Kind" }

                div class="flex items-center gap-x-6"
                {
                    div class="flex items-center gap-x-2"
                    {
                        input type="radio" name="kind" id="kind-asset" value="asset" checked;
                        label for="kind-asset" class=(FORM_LABEL_STYLE) { "Asset" }
                    }
                    div class="flex items-center gap-x-2"
                    {
                        input type="radio" name="kind" id="kind-liability" value="liability";
                        label for="kind-liability" class=(FORM_LABEL_STYLE) { "Liability" }
                    }
                }
            }

            div
            {
                label for="account_type" class=(FORM_LABEL_STYLE) { "Type" }
                select name="account_type" id="account_type" class=(FORM_SELECT_STYLE)
                {
                    @for account_type in ACCOUNT_TYPES {
                        option value=(account_type.label()) { (account_type.label()) }
                    }
                }
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }
                select name="currency" id="currency" class=(FORM_SELECT_STYLE)
                {
                    @for currency in SUPPORTED_CURRENCIES {
                        option value=(currency.code()) { (currency.code()) }
                    }
                }
            }

            div
            {
                label for="institution_id" class=(FORM_LABEL_STYLE) { "Institution" }
                select name="institution_id" id="institution_id" class=(FORM_SELECT_STYLE)
                {
                    option value="" { "None" }
                    @for institution in institutions {
                        option value=(institution.id) { (institution.name) }
                    }
                }
            }

            div
            {
                label for="number_full" class=(FORM_LABEL_STYLE) { "Account number (optional)" }
                input
                    type="text"
                    name="number_full"
                    id="number_full"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="credit_limit" class=(FORM_LABEL_STYLE) { "Credit limit (optional)" }
                input
                    type="text"
                    name="credit_limit"
                    id="credit_limit"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit" id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create"
            }
        }
    }
}

/// Display the form for creating a new account.
pub async fn get_new_account_page(
    State(state): State<NewAccountPageState>,
    Extension(token): Extension<AccessToken>,
) -> Response {
    let institutions = match state.backend.institutions(&token).await {
        Ok(institutions) => institutions,
        Err(error) => {
            tracing::warn!("Could not fetch institutions for new account page: {error}");
            Vec::new()
        }
    };

    let form = new_account_form(&institutions);
    let content = html! {
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())
        (centred_form("Create an account", &form))
    };

    base("New Account", &content).into_response()
}

#[cfg(test)]
mod new_account_page_tests {
    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;

    use crate::{auth::AccessToken, backend::BackendClient, endpoints};

    use super::{NewAccountPageState, get_new_account_page};

    fn get_test_server() -> TestServer {
        let state = NewAccountPageState {
            backend: BackendClient::new("http://127.0.0.1:9"),
        };

        let app = Router::new()
            .route(endpoints::NEW_ACCOUNT_VIEW, get(get_new_account_page))
            .layer(Extension(AccessToken("test-token".to_owned())))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn new_account_page_displays_form() {
        let server = get_test_server();

        let response = server.get(endpoints::NEW_ACCOUNT_VIEW).await;

        response.assert_status_ok();
        let document = scraper::Html::parse_document(&response.text());
        assert!(
            document.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            document.errors
        );

        let form_selector = scraper::Selector::parse("form").unwrap();
        let form = document
            .select(&form_selector)
            .next()
            .expect("expected a form");
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::ACCOUNTS_API));

        for selector_string in [
            "input[name=name]",
            "input[name=kind][type=radio]",
            "select[name=account_type]",
            "select[name=currency]",
            "select[name=institution_id]",
            "input[name=number_full]",
            "input[name=credit_limit]",
            "button[type=submit]",
        ] {
            let selector = scraper::Selector::parse(selector_string).unwrap();
            assert!(
                form.select(&selector).next().is_some(),
                "want form element matching {selector_string}"
            );
        }
    }
}
