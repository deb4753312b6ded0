//! The institutions page: a listing plus an inline create form.

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState,
    account::AccountStore,
    auth::AccessToken,
    backend::BackendClient,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        loading_spinner,
    },
    institution::{INSTITUTION_KINDS, Institution},
    navigation::NavBar,
};

/// The state needed for the institutions page.
#[derive(Debug, Clone)]
pub struct InstitutionState {
    /// The client for the ledger API.
    pub backend: BackendClient,
}

impl<A: AccountStore> FromRef<AppState<A>> for InstitutionState {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
        }
    }
}

fn institution_row(institution: &Institution) -> Markup {
    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                @match &institution.logo_url {
                    Some(logo_url) => {
                        img src=(logo_url) alt=(institution.name) class="w-8 h-8 rounded-full";
                    }
                    None => {
                        span
                            class="flex items-center justify-center w-8 h-8 rounded-full \
                            bg-blue-100 text-blue-800 text-xs font-semibold"
                        {
                            (institution.initials())
                        }
                    }
                }
            }
            td class=(TABLE_CELL_STYLE) { (institution.name) }
            td class=(TABLE_CELL_STYLE) { (institution.kind.label()) }
        }
    }
}

fn new_institution_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::INSTITUTIONS_API)
            hx-indicator="#indicator"
            class="flex flex-wrap items-end gap-4 mt-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }
                input
                    type="text"
                    name="name"
                    id="name"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }
                select name="kind" id="kind" class=(FORM_SELECT_STYLE)
                {
                    @for kind in INSTITUTION_KINDS {
                        option value=(kind.label()) { (kind.label()) }
                    }
                }
            }

            div
            {
                label for="logo_url" class=(FORM_LABEL_STYLE) { "Logo URL (optional)" }
                input
                    type="text"
                    name="logo_url"
                    id="logo_url"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Add institution"
            }
        }
    }
}

/// Display the institutions of the logged in user.
pub async fn get_institutions_page(
    State(state): State<InstitutionState>,
    Extension(token): Extension<AccessToken>,
) -> Response {
    let institutions = match state.backend.institutions(&token).await {
        Ok(institutions) => institutions,
        Err(error) => return error.into_response(),
    };

    let content = html! {
        (NavBar::new(endpoints::INSTITUTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white mb-6" { "Institutions" }

            @if institutions.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No institutions yet." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Logo" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                        }
                    }
                    tbody
                    {
                        @for institution in &institutions {
                            (institution_row(institution))
                        }
                    }
                }
            }

            (new_institution_form())
        }
    };

    base("Institutions", &content).into_response()
}

#[cfg(test)]
mod institutions_page_tests {
    use axum::{Extension, Router, routing::get};
    use axum_test::TestServer;

    use crate::{auth::AccessToken, backend::BackendClient, endpoints};

    use super::{InstitutionState, get_institutions_page};

    fn get_test_server() -> TestServer {
        let state = InstitutionState {
            // Port 9 (discard) is never listening in the test environment.
            backend: BackendClient::new("http://127.0.0.1:9"),
        };

        let app = Router::new()
            .route(endpoints::INSTITUTIONS_VIEW, get(get_institutions_page))
            .layer(Extension(AccessToken("test-token".to_owned())))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn unreachable_ledger_api_yields_internal_server_error() {
        let server = get_test_server();

        let response = server.get(endpoints::INSTITUTIONS_VIEW).await;

        response.assert_status_internal_server_error();
    }
}
