//! The endpoint for creating an institution.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    alert::Alert, auth::AccessToken, backend::NewInstitution, endpoints,
    institution::institutions_page::InstitutionState,
};

/// The form data for creating an institution.
#[derive(Debug, Deserialize)]
pub struct NewInstitutionForm {
    /// The display name.
    pub name: String,
    /// The category label.
    pub kind: String,
    /// A logo image URL, empty for none.
    pub logo_url: Option<String>,
}

/// Create an institution with the ledger API and redirect to the
/// institutions page.
pub async fn create_institution(
    State(state): State<InstitutionState>,
    Extension(token): Extension<AccessToken>,
    Form(form): Form<NewInstitutionForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Alert::error("Name required", "Give the institution a name.").into_html(),
        )
            .into_response();
    }

    let new_institution = NewInstitution {
        name: form.name.trim().to_owned(),
        kind: form.kind,
        logo_url: form.logo_url.filter(|url| !url.trim().is_empty()),
    };

    if let Err(error) = state
        .backend
        .create_institution(&token, &new_institution)
        .await
    {
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::INSTITUTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod create_institution_tests {
    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;

    use crate::{
        auth::AccessToken, backend::BackendClient, endpoints,
        institution::institutions_page::InstitutionState,
    };

    use super::create_institution;

    fn get_test_server() -> TestServer {
        let state = InstitutionState {
            // Port 9 (discard) is never listening in the test environment.
            backend: BackendClient::new("http://127.0.0.1:9"),
        };

        let app = Router::new()
            .route(endpoints::INSTITUTIONS_API, post(create_institution))
            .layer(Extension(AccessToken("test-token".to_owned())))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn blank_name_returns_alert() {
        let server = get_test_server();
        let form = [("name", "  "), ("kind", "bank")];

        let response = server.post(endpoints::INSTITUTIONS_API).form(&form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_text_contains("Name required");
    }

    #[tokio::test]
    async fn unreachable_ledger_api_returns_alert() {
        let server = get_test_server();
        let form = [("name", "State Bank"), ("kind", "bank")];

        let response = server.post(endpoints::INSTITUTIONS_API).form(&form).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_text_contains("Something went wrong");
    }
}
