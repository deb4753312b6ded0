//! Transaction and line domain types as reported by the ledger API.
//!
//! A transaction owns a set of lines; each line posts a non-negative amount
//! against one account in one direction. Whether the lines balance is the
//! backend's concern, not this layer's — the projector aggregates whatever
//! arrives.

use serde::{Deserialize, Serialize};

/// The posting direction of a transaction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Value flows into the line's account.
    Credit,
    /// Value flows out of the line's account.
    Debit,
}

/// One leg of a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Line {
    /// The account the line posts against.
    pub account_id: String,
    /// The non-negative amount in minor units.
    pub amount_minor: i64,
    /// Whether the amount is credited or debited.
    pub direction: Direction,
}

impl Line {
    /// The signed minor amount: positive for credits, negative for debits.
    pub fn signed_minor(&self) -> i64 {
        match self.direction {
            Direction::Credit => self.amount_minor,
            Direction::Debit => -self.amount_minor,
        }
    }
}

/// A transaction as reported by the ledger API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    /// The ID issued by the ledger API.
    pub id: String,
    /// The backend-defined kind label, e.g. "transfer" or "expense".
    pub kind: String,
    /// A free-form description.
    #[serde(default)]
    pub description: String,
    /// When the backend recorded the transaction, as an ISO timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// The ID of the transaction this one reverses, if any.
    #[serde(default)]
    pub reversal_of: Option<String>,
    /// The ID of the transaction that reversed this one, if any.
    #[serde(default)]
    pub reversed_by: Option<String>,
    /// Free-form metadata attached by the backend.
    #[serde(default)]
    pub meta: serde_json::Value,
    /// The lines posting against accounts. Not assumed to be exactly two.
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl Transaction {
    /// Whether the transaction is part of a reversal pair, in either role.
    pub fn is_reversed(&self) -> bool {
        self.reversal_of.is_some() || self.reversed_by.is_some()
    }
}

/// The transaction kinds offered by the create form.
pub const TRANSACTION_KINDS: [&str; 4] = ["transfer", "income", "expense", "adjustment"];
