//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The cookie module handles the lower level cookie auth logic.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    account::AccountStore,
    auth::{normalize_redirect_url, set_auth_cookie},
    backend::BackendClient,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, centred_form,
        loading_spinner,
    },
};

fn log_in_form(username: &str, error_message: Option<&str>, next: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#username, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(next) = next {
                input type="hidden" name="next" value=(next);
            }

            div
            {
                label for="username" class=(FORM_LABEL_STYLE) { "Username" }

                input
                    type="text"
                    name="username"
                    id="username"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus
                    value=(username);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;

                @if let Some(error_message) = error_message
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }
        }
    }
}

fn parse_next_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(next) => Some(next),
        None => {
            if let Some(next) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {next}");
            }
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<NextQuery>) -> Response {
    let next = parse_next_url(query.next.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, next.as_deref());
    let content = centred_form("Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The client for the ledger API that verifies credentials.
    pub backend: BackendClient,
}

impl<A: AccountStore> FromRef<AppState<A>> for LoginState {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            backend: state.backend.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

pub(crate) const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

pub(crate) const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// Handler for log-in requests via the POST method.
///
/// The credentials are forwarded to the ledger API. On success the bearer
/// token it returns is sealed into the auth cookie and the client is
/// redirected to the accounts page, or to the validated `next` target.
/// Otherwise, the form is returned with an error message explaining the
/// problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let next = parse_next_url(user_data.next.as_deref(), "log-in form");
    let next = next.as_deref();

    let token = match state
        .backend
        .log_in(&user_data.username, &user_data.password)
        .await
    {
        Ok(token) => token,
        Err(Error::InvalidCredentials) => {
            return log_in_form(
                &user_data.username,
                Some(INVALID_CREDENTIALS_ERROR_MSG),
                next,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return log_in_form(&user_data.username, Some(INTERNAL_ERROR_MSG), next)
                .into_response();
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let updated_jar = set_auth_cookie(jar, token, cookie_duration);
    let redirect_target = next.unwrap_or(endpoints::ACCOUNTS_VIEW);

    (
        updated_jar,
        HxRedirect(redirect_target.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

/// The query parameters accepted by the log-in page.
#[derive(Deserialize)]
pub struct NextQuery {
    /// Where to send the user after a successful log-in.
    pub next: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The credentials are held as plain strings. There is no validation here
/// since the ledger API is the authority on whether they are correct.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Username entered during log-in.
    pub username: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub next: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::{StatusCode, header::CONTENT_TYPE}};

    use crate::endpoints;

    use super::{NextQuery, get_log_in_page};

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page(Query(NextQuery { next: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::LOG_IN_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::LOG_IN_API,
            hx_post
        );

        let mut expected_form_elements: HashMap<&str, Vec<&str>> = HashMap::new();
        expected_form_elements.insert("input", vec!["text", "password"]);
        expected_form_elements.insert("button", vec!["submit"]);

        for (tag, element_types) in expected_form_elements {
            for element_type in element_types {
                let selector_string = format!("{tag}[type={element_type}]");
                let input_selector = scraper::Selector::parse(&selector_string).unwrap();
                let inputs = form.select(&input_selector).collect::<Vec<_>>();
                assert_eq!(
                    inputs.len(),
                    1,
                    "want 1 {element_type} {tag}, got {}",
                    inputs.len()
                );
            }
        }
    }

    #[tokio::test]
    async fn log_in_page_preserves_next_url() {
        let next = "/transactions?lower=51&upper=100".to_string();
        let response = get_log_in_page(Query(NextQuery {
            next: Some(next.clone()),
        }))
        .await;

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let input_selector = scraper::Selector::parse("input[name=next]").unwrap();
        let inputs = document.select(&input_selector).collect::<Vec<_>>();
        assert_eq!(inputs.len(), 1, "want 1 next input, got {}", inputs.len());
        let input = inputs.first().unwrap();
        assert_eq!(
            input.value().attr("value"),
            Some(next.as_str()),
            "expected next value to be preserved"
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_next_url() {
        let response = get_log_in_page(Query(NextQuery {
            next: Some("https://example.com".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let input_selector = scraper::Selector::parse("input[name=next]").unwrap();

        assert!(
            document.select(&input_selector).next().is_none(),
            "external next targets must not be echoed into the form"
        );
    }

    async fn parse_html_document(response: axum::response::Response) -> scraper::Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        scraper::Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &scraper::Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }
}

#[cfg(test)]
mod log_in_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};

    use crate::{auth::DEFAULT_COOKIE_DURATION, backend::BackendClient, endpoints};

    use super::{INTERNAL_ERROR_MSG, LoginState, post_log_in};

    fn get_test_state() -> LoginState {
        LoginState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            // Port 9 (discard) is never listening in the test environment.
            backend: BackendClient::new("http://127.0.0.1:9"),
        }
    }

    fn get_test_server() -> TestServer {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(get_test_state());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let server = get_test_server();

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn form_deserialises() {
        let server = get_test_server();
        let form = [
            ("username", "alice"),
            ("password", "test"),
            ("remember_me", "on"),
        ];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn form_deserialises_without_remember_me() {
        let server = get_test_server();
        let form = [("username", "alice"), ("password", "test")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        assert_ne!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unreachable_ledger_api_shows_internal_error_message() {
        let server = get_test_server();
        let form = [("username", "alice"), ("password", "test")];

        let response = server.post(endpoints::LOG_IN_API).form(&form).await;

        response.assert_status_ok();
        let fragment = scraper::Html::parse_fragment(&response.text());
        let error_selector = scraper::Selector::parse("p.text-red-500.text-base").unwrap();
        let error = fragment
            .select(&error_selector)
            .next()
            .expect("expected error message paragraph");
        let error_text = error.text().collect::<String>();
        assert_eq!(error_text.trim(), INTERNAL_ERROR_MSG);
    }
}
