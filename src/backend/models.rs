//! Wire types for the ledger API.

use serde::{Deserialize, Serialize};

use crate::{
    account::{Account, AccountKind, AccountStatus, AccountType},
    money::{Currency, mask_account_number},
};

/// An account as serialized by the ledger API.
///
/// The API reports both the stored balance and, when it has recomputed the
/// balance from transaction lines, a computed balance. The computed value
/// wins because the stored one can lag behind recent transactions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountRecord {
    /// The ID issued by the ledger API.
    pub id: String,
    /// The institution holding the account, if any.
    #[serde(default)]
    pub institution_id: Option<String>,
    /// The display name.
    pub name: String,
    /// Asset or liability.
    pub kind: AccountKind,
    /// The product category.
    #[serde(default, rename = "type")]
    pub account_type: Option<AccountType>,
    /// The currency the balance is stated in.
    pub currency: Currency,
    /// The full account number.
    #[serde(default)]
    pub number_full: Option<String>,
    /// The pre-masked account number.
    #[serde(default)]
    pub number_masked: Option<String>,
    /// The credit limit for card accounts, in minor units.
    #[serde(default)]
    pub credit_limit_minor: Option<i64>,
    /// The stored balance in minor units.
    #[serde(default)]
    pub balance_minor: i64,
    /// The balance recomputed from transaction lines, when available.
    #[serde(default)]
    pub computed_balance_minor: Option<i64>,
    /// The lifecycle state.
    #[serde(default = "default_status")]
    pub status: AccountStatus,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: serde_json::Value,
}

fn default_status() -> AccountStatus {
    AccountStatus::Active
}

impl AccountRecord {
    /// Convert the wire record into the domain [Account], preferring the
    /// computed balance over the stored one.
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            institution_id: self.institution_id,
            name: self.name,
            kind: self.kind,
            account_type: self.account_type,
            base_currency: self.currency,
            number_full: self.number_full,
            number_masked: self.number_masked,
            credit_limit_minor: self.credit_limit_minor,
            balance_minor: self.computed_balance_minor.unwrap_or(self.balance_minor),
            status: self.status,
            meta: self.meta,
        }
    }
}

/// The user profile as reported by the ledger API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileRecord {
    /// The user's preferred currency for totals, when one is set.
    #[serde(default)]
    pub base_currency: Option<Currency>,
}

/// The response to a successful log-in request.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// The bearer token for subsequent requests.
    pub access_token: String,
}

/// The response to a transaction count request.
#[derive(Debug, Deserialize)]
pub struct CountRecord {
    /// The total number of transactions on record.
    pub count: u64,
}

/// The payload for creating an account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    /// The display name.
    pub name: String,
    /// Asset or liability.
    pub kind: AccountKind,
    /// The product category.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    /// The institution holding the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    /// The currency the balance is stated in.
    pub currency: Currency,
    /// The full account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_full: Option<String>,
    /// The credit limit for card accounts, in minor units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit_minor: Option<i64>,
}

impl NewAccount {
    /// Build the [Account] the ledger API would create from this payload,
    /// assigning it `id`. New accounts start active with a zero balance.
    pub fn into_account(self, id: String) -> Account {
        let number_masked = self.number_full.as_deref().map(mask_account_number);

        Account {
            id,
            institution_id: self.institution_id,
            name: self.name,
            kind: self.kind,
            account_type: self.account_type,
            base_currency: self.currency,
            number_full: self.number_full,
            number_masked,
            credit_limit_minor: self.credit_limit_minor,
            balance_minor: 0,
            status: AccountStatus::Active,
            meta: serde_json::Value::Null,
        }
    }
}

/// The payload for updating an account's stored balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceUpdate {
    /// The new balance in minor units of the account's currency.
    pub balance_minor: i64,
}

/// The payload for creating an institution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInstitution {
    /// The display name.
    pub name: String,
    /// The category label, e.g. "bank".
    pub kind: String,
    /// A logo image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// The payload for creating a transaction.
///
/// The ledger API turns the from/to pair into balanced debit and credit
/// lines; one-sided payloads become single-line transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    /// The kind label, e.g. "transfer".
    pub kind: String,
    /// A free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// The account debited, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_from: Option<String>,
    /// The account credited, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_to: Option<String>,
    /// The non-negative amount in minor units.
    pub amount_minor: i64,
}
