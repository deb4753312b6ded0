//! The accounts overview page.
//!
//! Shows headline totals and a card per account, with balances optionally
//! converted into a display currency. Conversion only ever affects what is
//! rendered; stored balances stay in each account's own currency.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    account::{Account, AccountStore, kpi::{compute_kpi_totals, kpi_section}},
    auth::AccessToken,
    backend::BackendClient,
    endpoints,
    fx::{RateTable, convert_minor},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_SELECT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, base,
    },
    institution::Institution,
    money::{Currency, SUPPORTED_CURRENCIES, format_minor},
    navigation::NavBar,
    rates::RateClient,
};

/// The state needed for the accounts page.
#[derive(Debug, Clone)]
pub struct AccountsPageState<A: AccountStore> {
    /// The client for the ledger API.
    pub backend: BackendClient,
    /// The client for the exchange rate provider.
    pub rates: RateClient,
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for AccountsPageState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
            rates: state.rates.clone(),
            account_store: state.account_store.clone(),
        }
    }
}

/// The query parameters accepted by the accounts page.
#[derive(Deserialize)]
pub struct DisplayQuery {
    /// The display currency code, or "base" for the profile's base currency.
    pub currency: Option<String>,
}

async fn resolve_display_currency(
    backend: &BackendClient,
    token: &AccessToken,
    query_currency: Option<&str>,
) -> Currency {
    if let Some(code) = query_currency
        && code != "base"
    {
        return match Currency::from_code(code) {
            Ok(currency) => currency,
            Err(_) => {
                tracing::warn!("Unsupported display currency {code}, falling back to INR.");
                Currency::Inr
            }
        };
    }

    match backend.profile(token).await {
        Ok(profile) => profile.base_currency.unwrap_or_else(|| {
            tracing::warn!("Profile has no base currency set, falling back to INR.");
            Currency::Inr
        }),
        Err(error) => {
            tracing::warn!("Could not fetch profile for base currency: {error}");
            Currency::Inr
        }
    }
}

/// Display the accounts of the logged in user.
pub async fn get_accounts_page<A: AccountStore>(
    State(state): State<AccountsPageState<A>>,
    Extension(token): Extension<AccessToken>,
    Query(query): Query<DisplayQuery>,
) -> Response {
    let accounts = match state.account_store.list(&token).await {
        Ok(accounts) => accounts,
        Err(error) => return error.into_response(),
    };

    // Institution names are decoration here; the page still works without them.
    let institutions = match state.backend.institutions(&token).await {
        Ok(institutions) => institutions,
        Err(error) => {
            tracing::warn!("Could not fetch institutions for accounts page: {error}");
            Vec::new()
        }
    };

    let display_currency =
        resolve_display_currency(&state.backend, &token, query.currency.as_deref()).await;

    let rates = match state.rates.fetch(display_currency).await {
        Ok(rates) => rates,
        Err(error) => {
            tracing::warn!("Exchange rates unavailable: {error}");
            RateTable::empty(display_currency)
        }
    };

    let totals = compute_kpi_totals(&accounts, display_currency, &rates);

    let content = html! {
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="flex items-center justify-between mb-6"
            {
                h1 class="text-2xl font-bold text-gray-900 dark:text-white" { "Accounts" }
                (currency_selector(display_currency, query.currency.as_deref()))
            }

            (kpi_section(&totals, display_currency))

            div class="mb-4"
            {
                a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE) { "Create account" }
            }

            @if accounts.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No accounts yet." }
            } @else {
                div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4"
                {
                    @for account in &accounts {
                        (account_card(account, &institutions, display_currency, &rates))
                    }
                }
            }
        }
    };

    base("Accounts", &content).into_response()
}

fn currency_selector(display_currency: Currency, query_currency: Option<&str>) -> Markup {
    let base_selected = query_currency.is_none_or(|code| code == "base");

    html! {
        form method="get" action=(endpoints::ACCOUNTS_VIEW) class="flex items-center gap-2"
        {
            select name="currency" class=(FORM_SELECT_STYLE)
            {
                option value="base" selected[base_selected] { "Base currency" }
                @for currency in SUPPORTED_CURRENCIES {
                    option
                        value=(currency.code())
                        selected[!base_selected && currency == display_currency]
                    {
                        (currency.code())
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Show" }
        }
    }
}

fn account_card(
    account: &Account,
    institutions: &[Institution],
    display_currency: Currency,
    rates: &RateTable,
) -> Markup {
    let institution_name = account
        .institution_id
        .as_deref()
        .and_then(|id| institutions.iter().find(|institution| institution.id == id))
        .map(|institution| institution.name.as_str())
        .unwrap_or("-");

    // Owed amounts are displayed positive; the sign lives in the styling.
    let (balance_label, balance_minor, balance_style) = if account.owes() {
        ("Owed", -account.balance_minor, "text-red-600 dark:text-red-400")
    } else {
        (
            "Balance",
            account.balance_minor,
            "text-gray-900 dark:text-white",
        )
    };

    let converted = convert_minor(
        balance_minor,
        account.base_currency,
        display_currency,
        rates,
    );

    html! {
        div class=(CARD_STYLE)
        {
            div class="flex items-center justify-between"
            {
                h2 class="text-lg font-semibold text-gray-900 dark:text-white" { (account.name) }
                span class="text-xs text-gray-500 dark:text-gray-400"
                {
                    @match account.account_type {
                        Some(account_type) => (account_type.label()),
                        None => (account.kind.label()),
                    }
                }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" { (institution_name) }

            @if let Some(masked) = account.masked_number() {
                p class="text-sm text-gray-500 dark:text-gray-400 font-mono" { (masked) }
            }

            p class={ "text-xl font-semibold mt-2 " (balance_style) }
            {
                (balance_label) " "
                @match converted {
                    Some(amount_minor) => (format_minor(amount_minor, display_currency)),
                    None => (format_minor(balance_minor, account.base_currency)),
                }
            }

            @if converted.is_none() && account.base_currency != display_currency {
                p class="text-xs text-gray-500 dark:text-gray-400" { "Conversion unavailable" }
            }

            div class="flex gap-4 mt-3"
            {
                a
                    href=(endpoints::format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, &account.id))
                    class=(LINK_STYLE)
                {
                    "Edit"
                }

                button
                    hx-delete=(endpoints::format_endpoint(endpoints::ACCOUNT_API, &account.id))
                    hx-confirm="Delete this account?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}
