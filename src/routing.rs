//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, patch, post},
};

use crate::{
    AppState,
    account::{
        AccountStore, create_account, delete_account, get_accounts_page, get_edit_account_page,
        get_new_account_page, update_account,
    },
    auth::{auth_guard, auth_guard_hx, get_log_in_page, get_log_out, post_log_in},
    endpoints,
    institution::{create_institution, get_institutions_page},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::{create_transaction, delete_transaction, get_transactions_page},
};

/// Return a router with all the app's routes.
pub fn build_router<A: AccountStore>(state: AppState<A>) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page::<A>))
        .route(endpoints::NEW_ACCOUNT_VIEW, get(get_new_account_page))
        .route(
            endpoints::EDIT_ACCOUNT_VIEW,
            get(get_edit_account_page::<A>),
        )
        .route(endpoints::INSTITUTIONS_VIEW, get(get_institutions_page))
        .route(
            endpoints::TRANSACTIONS_VIEW,
            get(get_transactions_page::<A>),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PATCH/DELETE routes need to use the HX-Redirect header for
    // auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::ACCOUNTS_API, post(create_account::<A>))
            .route(
                endpoints::ACCOUNT_API,
                patch(update_account::<A>).delete(delete_account::<A>),
            )
            .route(endpoints::INSTITUTIONS_API, post(create_institution))
            .route(endpoints::TRANSACTIONS_API, post(create_transaction::<A>))
            .route(endpoints::TRANSACTION_API, delete(delete_transaction))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the accounts page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::ACCOUNTS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_accounts() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::ACCOUNTS_VIEW);
    }
}
