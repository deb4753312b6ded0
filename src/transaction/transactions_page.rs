//! The transactions page: a filterable window over the transaction history,
//! plus the create form.

use std::collections::HashSet;

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    account::{Account, AccountStore},
    auth::AccessToken,
    backend::BackendClient,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    money::{Currency, format_minor, parse_major},
    navigation::NavBar,
    transaction::{
        Overall, RowFilter, TRANSACTION_KINDS, TransactionRow, UNRESOLVED, project_row,
    },
};

/// How many transactions a page shows when the query does not say otherwise.
const DEFAULT_WINDOW_SIZE: u64 = 50;

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState<A: AccountStore> {
    /// The client for the ledger API.
    pub backend: BackendClient,
    /// The store for account data.
    pub account_store: A,
}

impl<A: AccountStore> FromRef<AppState<A>> for TransactionsPageState<A> {
    fn from_ref(state: &AppState<A>) -> Self {
        Self {
            backend: state.backend.clone(),
            account_store: state.account_store.clone(),
        }
    }
}

/// The query parameters accepted by the transactions page.
///
/// Multi-valued filters are comma-separated, e.g. `kind=expense,transfer`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct WindowQuery {
    /// The 1-based index of the first transaction to show.
    pub lower: Option<u64>,
    /// The 1-based index of the last transaction to show.
    pub upper: Option<u64>,
    /// Account IDs to keep, matching either side of a row.
    pub account: Option<String>,
    /// Institution IDs to keep, matching either side of a row.
    pub institution: Option<String>,
    /// Overall directions to keep.
    pub overall: Option<String>,
    /// Transaction kinds to keep.
    pub kind: Option<String>,
    /// Currency codes to keep.
    pub currency: Option<String>,
    /// The minimum amount in major units.
    pub min_amount: Option<String>,
    /// The maximum amount in major units.
    pub max_amount: Option<String>,
}

impl WindowQuery {
    /// The inclusive 1-based window, defaulting to the first
    /// [DEFAULT_WINDOW_SIZE] transactions. A reversed window is squashed to
    /// a single row rather than rejected.
    pub fn window(&self) -> (u64, u64) {
        let lower = self.lower.unwrap_or(1).max(1);
        let upper = self
            .upper
            .unwrap_or_else(|| lower.saturating_add(DEFAULT_WINDOW_SIZE - 1))
            .max(lower);

        (lower, upper)
    }

    /// Build the row filter from the comma-separated query parameters.
    ///
    /// Unknown overall labels and currency codes are dropped rather than
    /// failing the whole page.
    pub fn filter(&self) -> RowFilter {
        fn split(value: &Option<String>) -> HashSet<String> {
            value
                .iter()
                .flat_map(|value| value.split(','))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
                .collect()
        }

        let overall = split(&self.overall)
            .iter()
            .filter_map(|label| Overall::from_label(label))
            .collect();

        let currencies = split(&self.currency)
            .iter()
            .filter_map(|code| Currency::from_code(code).ok())
            .collect();

        // All supported currencies share a minor factor of 100, so amount
        // bounds parse the same regardless of the rows they apply to.
        let parse_bound = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .and_then(|value| parse_major(value, Currency::Inr).ok())
        };

        RowFilter {
            account_ids: split(&self.account),
            institution_ids: split(&self.institution),
            overall,
            kinds: split(&self.kind),
            currencies,
            min_amount_minor: parse_bound(&self.min_amount),
            max_amount_minor: parse_bound(&self.max_amount),
        }
    }

    fn with_window(&self, lower: u64, upper: u64) -> String {
        let mut params: Vec<(&str, String)> = vec![
            ("lower", lower.to_string()),
            ("upper", upper.to_string()),
        ];

        for (name, value) in [
            ("account", &self.account),
            ("institution", &self.institution),
            ("overall", &self.overall),
            ("kind", &self.kind),
            ("currency", &self.currency),
            ("min_amount", &self.min_amount),
            ("max_amount", &self.max_amount),
        ] {
            if let Some(value) = value
                && !value.trim().is_empty()
            {
                params.push((name, value.clone()));
            }
        }

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{}?{}", endpoints::TRANSACTIONS_VIEW, query),
            Err(error) => {
                tracing::error!("Could not encode transactions page query: {error}");
                endpoints::TRANSACTIONS_VIEW.to_owned()
            }
        }
    }
}

/// Display a window of the logged in user's transactions.
pub async fn get_transactions_page<A: AccountStore>(
    State(state): State<TransactionsPageState<A>>,
    Extension(token): Extension<AccessToken>,
    Query(query): Query<WindowQuery>,
) -> Response {
    // Account and institution names are best-effort; rows fall back to
    // unresolved placeholders without them.
    let accounts = match state.account_store.list(&token).await {
        Ok(accounts) => accounts,
        Err(error) => {
            tracing::warn!("Could not fetch accounts for transactions page: {error}");
            Vec::new()
        }
    };
    let institutions = match state.backend.institutions(&token).await {
        Ok(institutions) => institutions,
        Err(error) => {
            tracing::warn!("Could not fetch institutions for transactions page: {error}");
            Vec::new()
        }
    };

    let (lower, upper) = query.window();
    let transactions = match state.backend.transactions_range(&token, lower, upper).await {
        Ok(transactions) => transactions,
        Err(error) => return error.into_response(),
    };

    let count = match state.backend.transaction_count(&token).await {
        Ok(count) => Some(count),
        Err(error) => {
            tracing::warn!("Could not fetch transaction count: {error}");
            None
        }
    };

    let filter = query.filter();
    let rows: Vec<TransactionRow> = transactions
        .iter()
        .map(|transaction| project_row(transaction, &accounts, &institutions))
        .filter(|row| filter.is_empty() || filter.matches(row))
        .collect();

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold text-gray-900 dark:text-white mb-6" { "Transactions" }

            (filter_form(&query))

            @if rows.is_empty() {
                p class="text-gray-500 dark:text-gray-400 my-4" { "No transactions to show." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400 my-4"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "From" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "To" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "" }
                        }
                    }
                    tbody
                    {
                        @for row in &rows {
                            (transaction_row(row))
                        }
                    }
                }
            }

            (window_links(&query, lower, upper, count))

            (new_transaction_form(&accounts))
        }
    };

    base("Transactions", &content).into_response()
}

fn side_cell(institution: &str, account: &str) -> Markup {
    html! {
        td class=(TABLE_CELL_STYLE)
        {
            @if institution != UNRESOLVED {
                span class="block text-xs text-gray-400" { (institution) }
            }
            (account)
        }
    }
}

fn transaction_row(row: &TransactionRow) -> Markup {
    let amount_style = match row.polarity {
        1 => "text-green-600 dark:text-green-400",
        -1 => "text-red-600 dark:text-red-400",
        _ => "text-gray-500 dark:text-gray-400",
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                @match &row.timestamp {
                    Some(timestamp) => (timestamp),
                    None => (UNRESOLVED),
                }
            }

            (side_cell(&row.from_institution, &row.from_account))
            (side_cell(&row.to_institution, &row.to_account))

            td class=(TABLE_CELL_STYLE)
            {
                (row.kind)
                @if row.reversed {
                    span
                        class="ml-2 text-xs font-medium px-2 py-0.5 rounded \
                        bg-yellow-100 text-yellow-800"
                    {
                        "reversed"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (row.description) }

            td class={ (TABLE_CELL_STYLE) " font-medium " (amount_style) }
            {
                (format_minor(row.amount_minor, row.currency))
                span class="ml-1 text-xs text-gray-400" { (row.overall.label()) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(endpoints::format_endpoint(endpoints::TRANSACTION_API, &row.id))
                    hx-confirm="Delete this transaction?"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

fn filter_form(query: &WindowQuery) -> Markup {
    let text_filter = |name: &str, label: &str, value: &Option<String>| {
        html! {
            div
            {
                label for=(name) class=(FORM_LABEL_STYLE) { (label) }
                input
                    type="text"
                    name=(name)
                    id=(name)
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[value.as_deref()];
            }
        }
    };

    html! {
        details
        {
            summary class=(LINK_STYLE) { "Filters" }

            form method="get" action=(endpoints::TRANSACTIONS_VIEW)
                class="grid grid-cols-1 md:grid-cols-4 gap-4 mt-4"
            {
                (text_filter("account", "Accounts (IDs, comma-separated)", &query.account))
                (text_filter(
                    "institution",
                    "Institutions (IDs, comma-separated)",
                    &query.institution,
                ))
                (text_filter("overall", "Direction (credit, debit, neutral)", &query.overall))
                (text_filter("kind", "Kinds (comma-separated)", &query.kind))
                (text_filter("currency", "Currencies (comma-separated)", &query.currency))
                (text_filter("min_amount", "Minimum amount", &query.min_amount))
                (text_filter("max_amount", "Maximum amount", &query.max_amount))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
            }
        }
    }
}

fn window_links(query: &WindowQuery, lower: u64, upper: u64, count: Option<u64>) -> Markup {
    let window_size = upper - lower + 1;
    let has_previous = lower > 1;
    // Without a count, offer the next window and let it come back empty.
    let has_next = count.is_none_or(|count| upper < count);

    let previous_lower = lower.saturating_sub(window_size).max(1);
    let previous_upper = previous_lower + window_size - 1;

    html! {
        nav class="flex items-center gap-4 my-4"
        {
            @if has_previous {
                a href=(query.with_window(previous_lower, previous_upper)) class=(LINK_STYLE)
                {
                    "Previous"
                }
            }

            span class="text-sm text-gray-500 dark:text-gray-400"
            {
                (lower) "–" (upper)
                @if let Some(count) = count {
                    " of " (count)
                }
            }

            @if has_next {
                a
                    href=(query.with_window(
                        upper.saturating_add(1),
                        upper.saturating_add(window_size),
                    ))
                    class=(LINK_STYLE)
                {
                    "Next"
                }
            }
        }
    }
}

fn new_transaction_form(accounts: &[Account]) -> Markup {
    let account_select = |name: &str, label: &str| {
        html! {
            div
            {
                label for=(name) class=(FORM_LABEL_STYLE) { (label) }
                select name=(name) id=(name) class=(FORM_SELECT_STYLE)
                {
                    option value="" { "None" }
                    @for account in accounts {
                        option value=(account.id)
                        {
                            (account.name) " (" (account.base_currency.code()) ")"
                        }
                    }
                }
            }
        }
    };

    html! {
        h2 class="text-lg font-semibold text-gray-900 dark:text-white mt-6" { "New transaction" }

        form
            hx-post=(endpoints::TRANSACTIONS_API)
            class="grid grid-cols-1 md:grid-cols-3 gap-4 mt-2"
        {
            (account_select("account_from", "From"))
            (account_select("account_to", "To"))

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Kind" }
                select name="kind" id="kind" class=(FORM_SELECT_STYLE)
                {
                    @for kind in TRANSACTION_KINDS {
                        option value=(kind) { (kind) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }
                input
                    type="text"
                    name="amount"
                    id="amount"
                    placeholder="0.00"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }
                input
                    type="text"
                    name="description"
                    id="description"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="meta" class=(FORM_LABEL_STYLE) { "Metadata (JSON, optional)" }
                input
                    type="text"
                    name="meta"
                    id="meta"
                    placeholder="{}"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record" }
        }
    }
}
