//! The institution domain type.

use serde::{Deserialize, Serialize};

/// The category of a financial institution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstitutionKind {
    /// A retail bank.
    Bank,
    /// A brokerage.
    Broker,
    /// A card issuer.
    Card,
    /// Anything else.
    Other,
}

/// Every institution kind, in the order they appear in selectors.
pub const INSTITUTION_KINDS: [InstitutionKind; 4] = [
    InstitutionKind::Bank,
    InstitutionKind::Broker,
    InstitutionKind::Card,
    InstitutionKind::Other,
];

impl InstitutionKind {
    /// The label shown in views and option lists.
    pub fn label(&self) -> &'static str {
        match self {
            InstitutionKind::Bank => "bank",
            InstitutionKind::Broker => "broker",
            InstitutionKind::Card => "card",
            InstitutionKind::Other => "other",
        }
    }
}

/// A financial institution as reported by the ledger API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Institution {
    /// The ID issued by the ledger API.
    pub id: String,
    /// The display name.
    pub name: String,
    /// The category.
    pub kind: InstitutionKind,
    /// A logo image URL, if one is on record.
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl Institution {
    /// Up-to-two-letter initials for institutions without a logo.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}
