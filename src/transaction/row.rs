//! Derives one display row per transaction for tabular presentation.
//!
//! A row is a pure projection: it is recomputed from the raw transaction and
//! the account/institution reference tables on every load, carries no
//! authority over the ledger, and is never diffed against or merged with a
//! previous projection.

use std::collections::{BTreeMap, HashSet};

use crate::{
    account::{Account, AccountId, AccountKind},
    institution::Institution,
    money::Currency,
    transaction::Transaction,
};

/// Placeholder rendered for any side that does not resolve to a known
/// account or institution.
pub const UNRESOLVED: &str = "-";

/// The net direction of a transaction from the perspective of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overall {
    /// Some account received a positive net amount.
    Credit,
    /// No account received, but some account paid.
    Debit,
    /// Every account netted to zero.
    Neutral,
}

impl Overall {
    /// The label used in badges and filter options.
    pub fn label(&self) -> &'static str {
        match self {
            Overall::Credit => "credit",
            Overall::Debit => "debit",
            Overall::Neutral => "neutral",
        }
    }

    /// Parse a filter option label.
    pub fn from_label(label: &str) -> Option<Overall> {
        match label {
            "credit" => Some(Overall::Credit),
            "debit" => Some(Overall::Debit),
            "neutral" => Some(Overall::Neutral),
            _ => None,
        }
    }
}

/// A transaction flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    /// The transaction ID.
    pub id: String,
    /// The account that paid, when one resolved.
    pub from_account_id: Option<AccountId>,
    /// The account that received, when one resolved.
    pub to_account_id: Option<AccountId>,
    /// The paying account's institution ID, when known.
    pub from_institution_id: Option<String>,
    /// The receiving account's institution ID, when known.
    pub to_institution_id: Option<String>,
    /// The paying account's name, or [UNRESOLVED].
    pub from_account: String,
    /// The paying account's institution name, or [UNRESOLVED].
    pub from_institution: String,
    /// The receiving account's name, or [UNRESOLVED].
    pub to_account: String,
    /// The receiving account's institution name, or [UNRESOLVED].
    pub to_institution: String,
    /// The display currency, taken from the receiving account, then the
    /// paying account, then INR.
    pub currency: Currency,
    /// The row amount as a non-negative magnitude in minor units.
    pub amount_minor: i64,
    /// The net direction of the transaction.
    pub overall: Overall,
    /// +1 gain, -1 loss, 0 for internal transfers and fully unresolved rows.
    pub polarity: i8,
    /// The backend-defined kind label.
    pub kind: String,
    /// The transaction description.
    pub description: String,
    /// The backend timestamp, passed through for display.
    pub timestamp: Option<String>,
    /// Whether the transaction is part of a reversal pair.
    pub reversed: bool,
}

/// Project a transaction into a [TransactionRow].
///
/// Line amounts are aggregated into a net signed amount per account; the
/// account with the largest positive net becomes the "to" side and the one
/// with the most negative net the "from" side. Ties resolve to the lowest
/// account ID: the aggregation map is ordered by ID and the comparisons are
/// strict, so the first (lowest) ID wins.
///
/// Account or institution IDs missing from the reference tables degrade to
/// [UNRESOLVED]; this function never fails.
pub fn project_row(
    transaction: &Transaction,
    accounts: &[Account],
    institutions: &[Institution],
) -> TransactionRow {
    let mut net_by_account: BTreeMap<&str, i64> = BTreeMap::new();
    for line in &transaction.lines {
        *net_by_account.entry(line.account_id.as_str()).or_insert(0) += line.signed_minor();
    }

    let mut to_side: Option<(&str, i64)> = None;
    let mut from_side: Option<(&str, i64)> = None;
    for (&account_id, &net) in &net_by_account {
        if net > 0 && to_side.is_none_or(|(_, best)| net > best) {
            to_side = Some((account_id, net));
        }
        if net < 0 && from_side.is_none_or(|(_, worst)| net < worst) {
            from_side = Some((account_id, net));
        }
    }

    let find_account = |id: Option<&str>| id.and_then(|id| accounts.iter().find(|a| a.id == id));
    let to_account = find_account(to_side.map(|(id, _)| id));
    let from_account = find_account(from_side.map(|(id, _)| id));

    let find_institution = |account: Option<&Account>| {
        account
            .and_then(|a| a.institution_id.as_deref())
            .and_then(|id| institutions.iter().find(|i| i.id == id))
    };
    let to_institution = find_institution(to_account);
    let from_institution = find_institution(from_account);

    let currency = to_account
        .map(|a| a.base_currency)
        .or(from_account.map(|a| a.base_currency))
        .unwrap_or(Currency::Inr);

    let to_net = to_side.map(|(_, net)| net).unwrap_or(0);
    let from_net = from_side.map(|(_, net)| net).unwrap_or(0);

    let amount_minor = if to_net != 0 { to_net } else { from_net.abs() };

    let overall = if to_net > 0 {
        Overall::Credit
    } else if from_net < 0 {
        Overall::Debit
    } else {
        Overall::Neutral
    };

    // A transfer between two owned accounts is neither a gain nor a loss,
    // and a row where neither side resolves tells us nothing either way.
    let polarity = match (from_account, to_account) {
        (Some(_), Some(_)) | (None, None) => 0,
        (Some(account), None) => match account.kind {
            AccountKind::Liability => 1,
            AccountKind::Asset => -1,
        },
        (None, Some(account)) => match account.kind {
            AccountKind::Liability => -1,
            AccountKind::Asset => 1,
        },
    };

    let name_or_unresolved =
        |account: Option<&Account>| account.map_or(UNRESOLVED.to_owned(), |a| a.name.clone());
    let institution_or_unresolved = |institution: Option<&Institution>| {
        institution.map_or(UNRESOLVED.to_owned(), |i| i.name.clone())
    };

    TransactionRow {
        id: transaction.id.clone(),
        from_account_id: from_account.map(|a| a.id.clone()),
        to_account_id: to_account.map(|a| a.id.clone()),
        from_institution_id: from_account.and_then(|a| a.institution_id.clone()),
        to_institution_id: to_account.and_then(|a| a.institution_id.clone()),
        from_account: name_or_unresolved(from_account),
        from_institution: institution_or_unresolved(from_institution),
        to_account: name_or_unresolved(to_account),
        to_institution: institution_or_unresolved(to_institution),
        currency,
        amount_minor,
        overall,
        polarity,
        kind: transaction.kind.clone(),
        description: transaction.description.clone(),
        timestamp: transaction.created_at.clone(),
        reversed: transaction.is_reversed(),
    }
}

/// The row-level filter applied on the transactions page.
///
/// Each populated set or bound must match for a row to pass; empty sets and
/// unset bounds match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    /// Keep rows touching any of these accounts on either side.
    pub account_ids: HashSet<String>,
    /// Keep rows touching any of these institutions on either side.
    pub institution_ids: HashSet<String>,
    /// Keep rows with any of these overall directions.
    pub overall: HashSet<Overall>,
    /// Keep rows with any of these kinds.
    pub kinds: HashSet<String>,
    /// Keep rows in any of these currencies.
    pub currencies: HashSet<Currency>,
    /// Keep rows with an amount of at least this many minor units.
    pub min_amount_minor: Option<i64>,
    /// Keep rows with an amount of at most this many minor units.
    pub max_amount_minor: Option<i64>,
}

impl RowFilter {
    /// Whether the filter has no criteria at all.
    pub fn is_empty(&self) -> bool {
        *self == RowFilter::default()
    }

    /// Whether `row` passes every populated criterion.
    pub fn matches(&self, row: &TransactionRow) -> bool {
        if !self.account_ids.is_empty() {
            let touches = row
                .from_account_id
                .as_ref()
                .is_some_and(|id| self.account_ids.contains(id))
                || row
                    .to_account_id
                    .as_ref()
                    .is_some_and(|id| self.account_ids.contains(id));
            if !touches {
                return false;
            }
        }

        if !self.institution_ids.is_empty() {
            let touches = row
                .from_institution_id
                .as_ref()
                .is_some_and(|id| self.institution_ids.contains(id))
                || row
                    .to_institution_id
                    .as_ref()
                    .is_some_and(|id| self.institution_ids.contains(id));
            if !touches {
                return false;
            }
        }

        if !self.overall.is_empty() && !self.overall.contains(&row.overall) {
            return false;
        }

        if !self.kinds.is_empty() && !self.kinds.contains(&row.kind) {
            return false;
        }

        if !self.currencies.is_empty() && !self.currencies.contains(&row.currency) {
            return false;
        }

        if let Some(min) = self.min_amount_minor
            && row.amount_minor < min
        {
            return false;
        }

        if let Some(max) = self.max_amount_minor
            && row.amount_minor > max
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod project_row_tests {
    use super::{Overall, UNRESOLVED, project_row};
    use crate::{
        account::{Account, AccountKind, AccountStatus},
        institution::{Institution, InstitutionKind},
        money::Currency,
        transaction::{Direction, Line, Transaction},
    };

    fn account(id: &str, name: &str, kind: AccountKind, currency: Currency) -> Account {
        Account {
            id: id.to_owned(),
            institution_id: Some(format!("inst-{id}")),
            name: name.to_owned(),
            kind,
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

    fn institution(id: &str, name: &str) -> Institution {
        Institution {
            id: id.to_owned(),
            name: name.to_owned(),
            kind: InstitutionKind::Bank,
            logo_url: None,
        }
    }

    fn line(account_id: &str, amount_minor: i64, direction: Direction) -> Line {
        Line {
            account_id: account_id.to_owned(),
            amount_minor,
            direction,
        }
    }

    fn transaction(lines: Vec<Line>) -> Transaction {
        Transaction {
            id: "tx-1".to_owned(),
            kind: "transfer".to_owned(),
            description: String::new(),
            created_at: None,
            reversal_of: None,
            reversed_by: None,
            meta: serde_json::Value::Null,
            lines,
        }
    }

    #[test]
    fn balanced_two_line_transfer_resolves_both_sides() {
        let accounts = vec![
            account("1", "Checking", AccountKind::Asset, Currency::Usd),
            account("2", "Savings", AccountKind::Asset, Currency::Usd),
        ];
        let institutions = vec![
            institution("inst-1", "First Bank"),
            institution("inst-2", "Second Bank"),
        ];
        let transaction = transaction(vec![
            line("1", 5000, Direction::Debit),
            line("2", 5000, Direction::Credit),
        ]);

        let row = project_row(&transaction, &accounts, &institutions);

        assert_eq!("Checking", row.from_account);
        assert_eq!("First Bank", row.from_institution);
        assert_eq!("Savings", row.to_account);
        assert_eq!("Second Bank", row.to_institution);
        assert_eq!(Overall::Credit, row.overall);
        assert_eq!(5000, row.amount_minor);
        assert_eq!(0, row.polarity, "an internal transfer is neither gain nor loss");
    }

    #[test]
    fn same_account_netting_to_zero_resolves_neither_side() {
        let accounts = vec![account("1", "Checking", AccountKind::Asset, Currency::Usd)];
        let transaction = transaction(vec![
            line("1", 5000, Direction::Credit),
            line("1", 5000, Direction::Debit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(UNRESOLVED, row.from_account);
        assert_eq!(UNRESOLVED, row.to_account);
        assert_eq!(Overall::Neutral, row.overall);
        assert_eq!(0, row.amount_minor);
        assert_eq!(0, row.polarity);
    }

    #[test]
    fn nets_are_aggregated_per_account_across_many_lines() {
        let accounts = vec![
            account("1", "Checking", AccountKind::Asset, Currency::Usd),
            account("2", "Savings", AccountKind::Asset, Currency::Usd),
        ];
        // Account 1 nets to -2000, account 2 nets to +2000.
        let transaction = transaction(vec![
            line("1", 5000, Direction::Debit),
            line("1", 3000, Direction::Credit),
            line("2", 1500, Direction::Credit),
            line("2", 500, Direction::Credit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!("Checking", row.from_account);
        assert_eq!("Savings", row.to_account);
        assert_eq!(2000, row.amount_minor);
    }

    #[test]
    fn equal_nets_tie_break_to_the_lowest_account_id() {
        let accounts = vec![
            account("a", "Alpha", AccountKind::Asset, Currency::Usd),
            account("b", "Bravo", AccountKind::Asset, Currency::Usd),
            account("c", "Charlie", AccountKind::Asset, Currency::Usd),
        ];
        let transaction = transaction(vec![
            line("c", 1000, Direction::Credit),
            line("b", 1000, Direction::Credit),
            line("a", 2000, Direction::Debit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(Some("b".to_owned()), row.to_account_id);
    }

    #[test]
    fn unknown_account_reference_degrades_to_placeholders() {
        let transaction = transaction(vec![
            line("missing", 5000, Direction::Debit),
            line("also-missing", 5000, Direction::Credit),
        ]);

        let row = project_row(&transaction, &[], &[]);

        assert_eq!(UNRESOLVED, row.from_account);
        assert_eq!(UNRESOLVED, row.from_institution);
        assert_eq!(UNRESOLVED, row.to_account);
        assert_eq!(UNRESOLVED, row.to_institution);
        // The nets are still visible even though nothing resolved.
        assert_eq!(Overall::Credit, row.overall);
        assert_eq!(5000, row.amount_minor);
        assert_eq!(0, row.polarity);
    }

    #[test]
    fn external_outflow_from_an_asset_is_a_loss() {
        let accounts = vec![account("1", "Checking", AccountKind::Asset, Currency::Usd)];
        let transaction = transaction(vec![
            line("1", 5000, Direction::Debit),
            line("external", 5000, Direction::Credit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(-1, row.polarity);
    }

    #[test]
    fn paying_down_a_liability_counts_as_a_gain() {
        let accounts = vec![account("1", "Card", AccountKind::Liability, Currency::Inr)];
        let transaction = transaction(vec![
            line("1", 5000, Direction::Debit),
            line("external", 5000, Direction::Credit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(1, row.polarity);
    }

    #[test]
    fn external_inflow_to_an_asset_is_a_gain() {
        let accounts = vec![account("1", "Checking", AccountKind::Asset, Currency::Usd)];
        let transaction = transaction(vec![
            line("external", 5000, Direction::Debit),
            line("1", 5000, Direction::Credit),
        ]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(1, row.polarity);
        assert_eq!(Overall::Credit, row.overall);
    }

    #[test]
    fn currency_prefers_the_to_side_then_the_from_side() {
        let accounts = vec![
            account("1", "Checking", AccountKind::Asset, Currency::Gbp),
            account("2", "Savings", AccountKind::Asset, Currency::Cad),
        ];
        let transfer = transaction(vec![
            line("1", 5000, Direction::Debit),
            line("2", 5000, Direction::Credit),
        ]);

        let row = project_row(&transfer, &accounts, &[]);
        assert_eq!(Currency::Cad, row.currency);

        let outflow = transaction(vec![line("1", 5000, Direction::Debit)]);
        let row = project_row(&outflow, &accounts, &[]);
        assert_eq!(Currency::Gbp, row.currency);

        let unresolved = transaction(vec![line("missing", 5000, Direction::Debit)]);
        let row = project_row(&unresolved, &[], &[]);
        assert_eq!(Currency::Inr, row.currency);
    }

    #[test]
    fn debit_only_transaction_uses_the_from_magnitude() {
        let accounts = vec![account("1", "Checking", AccountKind::Asset, Currency::Usd)];
        let transaction = transaction(vec![line("1", 7500, Direction::Debit)]);

        let row = project_row(&transaction, &accounts, &[]);

        assert_eq!(Overall::Debit, row.overall);
        assert_eq!(7500, row.amount_minor);
    }

    #[test]
    fn transaction_with_no_lines_is_neutral() {
        let transaction = transaction(vec![]);

        let row = project_row(&transaction, &[], &[]);

        assert_eq!(Overall::Neutral, row.overall);
        assert_eq!(0, row.amount_minor);
        assert_eq!(0, row.polarity);
    }
}

#[cfg(test)]
mod row_filter_tests {
    use std::collections::HashSet;

    use super::{Overall, RowFilter, TransactionRow, UNRESOLVED};
    use crate::money::Currency;

    fn test_row() -> TransactionRow {
        TransactionRow {
            id: "tx-1".to_owned(),
            from_account_id: Some("1".to_owned()),
            to_account_id: Some("2".to_owned()),
            from_institution_id: Some("inst-1".to_owned()),
            to_institution_id: Some("inst-2".to_owned()),
            from_account: "Checking".to_owned(),
            from_institution: "First Bank".to_owned(),
            to_account: "Savings".to_owned(),
            to_institution: "Second Bank".to_owned(),
            currency: Currency::Usd,
            amount_minor: 5000,
            overall: Overall::Credit,
            polarity: 0,
            kind: "transfer".to_owned(),
            description: String::new(),
            timestamp: None,
            reversed: false,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RowFilter::default().is_empty());
        assert!(RowFilter::default().matches(&test_row()));
    }

    #[test]
    fn account_filter_matches_either_side() {
        let filter = RowFilter {
            account_ids: HashSet::from(["1".to_owned()]),
            ..Default::default()
        };
        assert!(filter.matches(&test_row()));

        let filter = RowFilter {
            account_ids: HashSet::from(["2".to_owned()]),
            ..Default::default()
        };
        assert!(filter.matches(&test_row()));

        let filter = RowFilter {
            account_ids: HashSet::from(["3".to_owned()]),
            ..Default::default()
        };
        assert!(!filter.matches(&test_row()));
    }

    #[test]
    fn unresolved_sides_do_not_match_account_filters() {
        let mut row = test_row();
        row.from_account_id = None;
        row.to_account_id = None;
        row.from_account = UNRESOLVED.to_owned();
        row.to_account = UNRESOLVED.to_owned();

        let filter = RowFilter {
            account_ids: HashSet::from(["1".to_owned()]),
            ..Default::default()
        };

        assert!(!filter.matches(&row));
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let filter = RowFilter {
            min_amount_minor: Some(5000),
            max_amount_minor: Some(5000),
            ..Default::default()
        };
        assert!(filter.matches(&test_row()));

        let filter = RowFilter {
            min_amount_minor: Some(5001),
            ..Default::default()
        };
        assert!(!filter.matches(&test_row()));

        let filter = RowFilter {
            max_amount_minor: Some(4999),
            ..Default::default()
        };
        assert!(!filter.matches(&test_row()));
    }

    #[test]
    fn overall_kind_and_currency_filters_combine() {
        let filter = RowFilter {
            overall: HashSet::from([Overall::Credit]),
            kinds: HashSet::from(["transfer".to_owned()]),
            currencies: HashSet::from([Currency::Usd]),
            ..Default::default()
        };
        assert!(filter.matches(&test_row()));

        let filter = RowFilter {
            overall: HashSet::from([Overall::Debit]),
            ..Default::default()
        };
        assert!(!filter.matches(&test_row()));
    }
}
