//! The headline totals shown at the top of the accounts page.

use maud::{Markup, html};

use crate::{
    account::{Account, AccountKind, AccountStatus},
    fx::{RateTable, convert_minor},
    html::CARD_STYLE,
    money::{Currency, format_minor},
};

/// The headline totals for the accounts page, in the display currency.
///
/// Each total is `None` when any contributing balance could not be converted,
/// since a partial sum would be misleading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpiTotals {
    /// The sum of all asset balances.
    pub assets_minor: Option<i64>,
    /// The total owed across liabilities, as a positive amount.
    pub owed_minor: Option<i64>,
    /// The sum of balances in investment-typed accounts.
    pub investments_minor: Option<i64>,
    /// Assets less owed.
    pub net_minor: Option<i64>,
    /// Assets less investments less owed: what could be spent tomorrow.
    pub liquidity_minor: Option<i64>,
}

fn sum_converted<'a>(
    accounts: impl Iterator<Item = (&'a Account, i64)>,
    display_currency: Currency,
    rates: &RateTable,
) -> Option<i64> {
    let mut total = 0i64;

    for (account, amount_minor) in accounts {
        let converted =
            convert_minor(amount_minor, account.base_currency, display_currency, rates)?;
        total += converted;
    }

    Some(total)
}

/// Compute the accounts page totals in `display_currency`.
///
/// Closed accounts are excluded. Owed is the sum of the absolute values of
/// all liability balances.
pub fn compute_kpi_totals(
    accounts: &[Account],
    display_currency: Currency,
    rates: &RateTable,
) -> KpiTotals {
    let open: Vec<&Account> = accounts
        .iter()
        .filter(|account| account.status != AccountStatus::Closed)
        .collect();

    let assets_minor = sum_converted(
        open.iter()
            .filter(|account| account.kind == AccountKind::Asset)
            .map(|account| (*account, account.balance_minor)),
        display_currency,
        rates,
    );

    let owed_minor = sum_converted(
        open.iter()
            .filter(|account| account.kind == AccountKind::Liability)
            .map(|account| (*account, account.balance_minor.abs())),
        display_currency,
        rates,
    );

    let investments_minor = sum_converted(
        open.iter()
            .filter(|account| {
                account
                    .account_type
                    .is_some_and(|account_type| account_type.is_investment())
            })
            .map(|account| (*account, account.balance_minor)),
        display_currency,
        rates,
    );

    let net_minor = match (assets_minor, owed_minor) {
        (Some(assets), Some(owed)) => Some(assets - owed),
        _ => None,
    };

    let liquidity_minor = match (assets_minor, investments_minor, owed_minor) {
        (Some(assets), Some(investments), Some(owed)) => Some(assets - investments - owed),
        _ => None,
    };

    KpiTotals {
        assets_minor,
        owed_minor,
        investments_minor,
        net_minor,
        liquidity_minor,
    }
}

fn kpi_card(title: &str, total_minor: Option<i64>, display_currency: Currency) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            p class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class="text-2xl font-semibold text-gray-900 dark:text-white"
            {
                @match total_minor {
                    Some(amount_minor) => (format_minor(amount_minor, display_currency)),
                    None => "Unavailable",
                }
            }
        }
    }
}

/// Render the row of KPI cards.
pub fn kpi_section(totals: &KpiTotals, display_currency: Currency) -> Markup {
    html! {
        section class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4 mb-6"
        {
            (kpi_card("Total Assets", totals.assets_minor, display_currency))
            (kpi_card("Total Owed", totals.owed_minor, display_currency))
            (kpi_card("Investments", totals.investments_minor, display_currency))
            (kpi_card("Net Position", totals.net_minor, display_currency))
            (kpi_card("Liquidity", totals.liquidity_minor, display_currency))
        }
    }
}

#[cfg(test)]
mod kpi_tests {
    use crate::{
        account::{Account, AccountKind, AccountStatus, AccountType},
        fx::RateTable,
        money::Currency,
    };

    use super::compute_kpi_totals;

    fn account(
        id: &str,
        kind: AccountKind,
        account_type: Option<AccountType>,
        currency: Currency,
        balance_minor: i64,
    ) -> Account {
        Account {
            id: id.to_owned(),
            institution_id: None,
            name: id.to_owned(),
            kind,
            account_type,
            base_currency: currency,
            number_full: None,
            number_masked: None,
            credit_limit_minor: None,
            balance_minor,
            status: AccountStatus::Active,
            meta: serde_json::Value::Null,
        }
    }

    #[test]
    fn totals_in_a_single_currency() {
        let accounts = vec![
            account(
                "1",
                AccountKind::Asset,
                Some(AccountType::Bank),
                Currency::Inr,
                500_000,
            ),
            account(
                "2",
                AccountKind::Asset,
                Some(AccountType::MutualFund),
                Currency::Inr,
                300_000,
            ),
            account(
                "3",
                AccountKind::Liability,
                Some(AccountType::CreditCard),
                Currency::Inr,
                -250_000,
            ),
        ];

        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(Some(800_000), totals.assets_minor);
        assert_eq!(Some(250_000), totals.owed_minor);
        assert_eq!(Some(300_000), totals.investments_minor);
        assert_eq!(Some(550_000), totals.net_minor);
        assert_eq!(Some(250_000), totals.liquidity_minor);
    }

    #[test]
    fn closed_accounts_are_excluded() {
        let mut closed = account(
            "1",
            AccountKind::Asset,
            Some(AccountType::Bank),
            Currency::Inr,
            500_000,
        );
        closed.status = AccountStatus::Closed;
        let accounts = vec![
            closed,
            account(
                "2",
                AccountKind::Asset,
                Some(AccountType::Bank),
                Currency::Inr,
                100_000,
            ),
        ];

        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(Some(100_000), totals.assets_minor);
    }

    #[test]
    fn missing_rate_makes_the_affected_totals_unavailable() {
        let accounts = vec![
            account(
                "1",
                AccountKind::Asset,
                Some(AccountType::Bank),
                Currency::Usd,
                10_000,
            ),
            account(
                "2",
                AccountKind::Liability,
                Some(AccountType::CreditCard),
                Currency::Inr,
                -250_000,
            ),
        ];

        // No USD rate in the table, so assets (and net) cannot be stated.
        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(None, totals.assets_minor);
        assert_eq!(Some(250_000), totals.owed_minor);
        assert_eq!(Some(0), totals.investments_minor);
        assert_eq!(None, totals.net_minor);
        assert_eq!(None, totals.liquidity_minor);
    }

    #[test]
    fn converts_across_currencies() {
        let accounts = vec![account(
            "1",
            AccountKind::Asset,
            Some(AccountType::Bank),
            Currency::Usd,
            10_000,
        )];
        let rates = RateTable::with_rates(Currency::Usd, [(Currency::Inr, 83.0)]);

        let totals = compute_kpi_totals(&accounts, Currency::Inr, &rates);

        assert_eq!(Some(830_000), totals.assets_minor);
    }

    #[test]
    fn positive_liability_balance_contributes_its_absolute_value() {
        let accounts = vec![account(
            "1",
            AccountKind::Liability,
            Some(AccountType::CreditCard),
            Currency::Inr,
            5_000,
        )];

        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(Some(5_000), totals.owed_minor);
    }

    #[test]
    fn unconvertible_liability_makes_owed_unavailable() {
        let accounts = vec![account(
            "1",
            AccountKind::Liability,
            Some(AccountType::CreditCard),
            Currency::Usd,
            5_000,
        )];

        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(None, totals.owed_minor);
    }

    #[test]
    fn investment_typed_accounts_count_regardless_of_kind() {
        let accounts = vec![account(
            "1",
            AccountKind::Liability,
            Some(AccountType::OtherInvestment),
            Currency::Inr,
            -40_000,
        )];

        let totals =
            compute_kpi_totals(&accounts, Currency::Inr, &RateTable::empty(Currency::Inr));

        assert_eq!(Some(-40_000), totals.investments_minor);
    }
}
