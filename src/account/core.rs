//! The account domain type and its classification enums.

use serde::{Deserialize, Serialize};

use crate::money::{Currency, mask_account_number};

/// Accounts are identified by opaque string IDs issued by the ledger API.
pub type AccountId = String;

/// Whether an account holds value or owes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// The account holds value belonging to the user.
    Asset,
    /// The account tracks money the user owes.
    Liability,
}

impl AccountKind {
    /// The label shown in views and option lists.
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Asset => "asset",
            AccountKind::Liability => "liability",
        }
    }
}

/// The product category of an account, as labelled by the ledger API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// An everyday bank account.
    #[serde(rename = "bank")]
    Bank,
    /// A credit card.
    #[serde(rename = "credit card")]
    CreditCard,
    /// A fixed deposit.
    #[serde(rename = "fixed deposit")]
    FixedDeposit,
    /// A mutual fund holding.
    #[serde(rename = "mutual fund")]
    MutualFund,
    /// Any other investment product.
    #[serde(rename = "other investment")]
    OtherInvestment,
    /// Any other asset.
    #[serde(rename = "other asset")]
    OtherAsset,
    /// Any other liability.
    #[serde(rename = "other liability")]
    OtherLiability,
}

impl AccountType {
    /// Whether the account counts towards the investments KPI total.
    pub fn is_investment(&self) -> bool {
        matches!(
            self,
            AccountType::FixedDeposit | AccountType::MutualFund | AccountType::OtherInvestment
        )
    }

    /// The label shown in views and option lists.
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Bank => "bank",
            AccountType::CreditCard => "credit card",
            AccountType::FixedDeposit => "fixed deposit",
            AccountType::MutualFund => "mutual fund",
            AccountType::OtherInvestment => "other investment",
            AccountType::OtherAsset => "other asset",
            AccountType::OtherLiability => "other liability",
        }
    }
}

/// Every account type, in the order they appear in selectors.
pub const ACCOUNT_TYPES: [AccountType; 7] = [
    AccountType::Bank,
    AccountType::CreditCard,
    AccountType::FixedDeposit,
    AccountType::MutualFund,
    AccountType::OtherInvestment,
    AccountType::OtherAsset,
    AccountType::OtherLiability,
];

/// The lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// The account is in use.
    Active,
    /// The account is dormant but not closed.
    Inactive,
    /// The account has been closed.
    Closed,
}

/// An account as reported by the ledger API.
///
/// `balance_minor` is authoritative only as returned by the backend; this
/// layer never recomputes it, only displays it (converted or not).
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The ID issued by the ledger API.
    pub id: AccountId,
    /// The institution holding the account, if any.
    pub institution_id: Option<String>,
    /// The display name of the account.
    pub name: String,
    /// Asset or liability.
    pub kind: AccountKind,
    /// The product category, if the backend recorded one.
    pub account_type: Option<AccountType>,
    /// The currency the balance is stated in.
    pub base_currency: Currency,
    /// The full account number. Never rendered directly.
    pub number_full: Option<String>,
    /// The pre-masked account number, if the backend stored one.
    pub number_masked: Option<String>,
    /// The credit limit for card accounts, in minor units.
    pub credit_limit_minor: Option<i64>,
    /// The signed balance in minor units of `base_currency`. Liabilities are
    /// stored negative.
    pub balance_minor: i64,
    /// The lifecycle state.
    pub status: AccountStatus,
    /// Free-form metadata attached by the backend.
    pub meta: serde_json::Value,
}

impl Account {
    /// Whether the account currently carries debt.
    ///
    /// Liability balances arrive negative from the backend; a liability with
    /// a negative balance is money owed and is displayed as a positive
    /// "owed" amount rather than a negative asset.
    pub fn owes(&self) -> bool {
        self.kind == AccountKind::Liability && self.balance_minor < 0
    }

    /// The masked account number for display, preferring the backend's
    /// pre-masked value and deriving one from the full number otherwise.
    pub fn masked_number(&self) -> Option<String> {
        if let Some(masked) = &self.number_masked {
            return Some(masked.clone());
        }

        self.number_full
            .as_deref()
            .map(mask_account_number)
    }
}
