//! Currency codes and minor-unit money handling.
//!
//! All amounts are stored and transmitted as signed integers in a currency's
//! minor unit (cents, paise, pence). Conversion to major units happens only
//! at the display edge.

use std::{fmt, sync::OnceLock};

use numfmt::{Formatter, Precision};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The currencies supported for account balances and display conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian rupee.
    Inr,
    /// United States dollar.
    Usd,
    /// Canadian dollar.
    Cad,
    /// Pound sterling.
    Gbp,
}

/// Every supported currency, in the order they appear in selectors.
pub const SUPPORTED_CURRENCIES: [Currency; 4] =
    [Currency::Inr, Currency::Usd, Currency::Cad, Currency::Gbp];

impl Currency {
    /// The ISO 4217 code for the currency.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
            Currency::Gbp => "GBP",
        }
    }

    /// The symbol shown before formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Cad => "C$",
            Currency::Gbp => "£",
        }
    }

    /// Minor units per major unit. All supported currencies use two decimal
    /// digits.
    pub fn minor_factor(&self) -> i64 {
        100
    }

    /// Parse a currency code, tolerating surrounding whitespace and lowercase
    /// input as returned by external services.
    pub fn from_code(code: &str) -> Result<Currency, Error> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Ok(Currency::Inr),
            "USD" => Ok(Currency::Usd),
            "CAD" => Ok(Currency::Cad),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(Error::UnknownCurrency(code.to_owned())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Format a minor-unit amount with the currency's symbol and digit grouping.
///
/// Negative amounts keep a leading minus sign before the symbol. INR uses
/// Indian grouping (`12,34,567.89`); the other currencies group by thousands.
pub fn format_minor(amount_minor: i64, currency: Currency) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let magnitude = amount_minor.unsigned_abs();

    let formatted = match currency {
        Currency::Inr => format_major_indian(magnitude),
        _ => format_major_grouped(magnitude as f64 / currency.minor_factor() as f64),
    };

    format!("{sign}{}{formatted}", currency.symbol())
}

fn format_major_grouped(major: f64) -> String {
    static FMT: OnceLock<Formatter> = OnceLock::new();

    let fmt = FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    // Zero is hardcoded as "0", so we must specify the formatted string for zero
    if major == 0.0 {
        return "0.00".to_owned();
    }

    let mut formatted = fmt.fmt_string(major);

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    if formatted.as_bytes()[formatted.len() - 3] != b'.' {
        formatted = format!("{formatted}0");
    }

    formatted
}

/// Indian digit grouping: the last three integer digits form one group, then
/// groups of two, e.g. 1234567.89 formats as "12,34,567.89".
fn format_major_indian(amount_minor: u64) -> String {
    let major = amount_minor / 100;
    let cents = amount_minor % 100;

    let digits = major.to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<String> = Vec::new();
        let head_bytes = head.as_bytes();
        let mut index = head_bytes.len();
        while index > 0 {
            let start = index.saturating_sub(2);
            groups.push(head[start..index].to_owned());
            index = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{grouped}.{cents:02}")
}

/// Parse a user-entered major-unit amount into minor units.
///
/// Currency symbols, grouping separators, and surrounding text are stripped
/// before parsing, so "$1,234.56" and "1234.56" both parse to 123456.
///
/// # Errors
/// Returns [Error::InvalidAmount] if no number remains after stripping, or if
/// the amount does not fit in minor units.
pub fn parse_major(value: &str, currency: Currency) -> Result<i64, Error> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let major: f64 = cleaned
        .parse()
        .map_err(|_| Error::InvalidAmount(value.to_owned()))?;

    if !major.is_finite() {
        return Err(Error::InvalidAmount(value.to_owned()));
    }

    let minor = (major * currency.minor_factor() as f64).round();

    // The cast below saturates, so amounts that would clamp to the i64 limits
    // are rejected instead of silently changing value. i64::MIN is excluded
    // too since its absolute value does not exist.
    if minor <= i64::MIN as f64 || minor >= i64::MAX as f64 {
        return Err(Error::InvalidAmount(value.to_owned()));
    }

    Ok(minor as i64)
}

/// Mask an account number for display.
///
/// Numbers of four or more characters render as `"****"` plus the last four;
/// shorter numbers are returned unmasked.
pub fn mask_account_number(full: &str) -> String {
    let chars: Vec<char> = full.chars().collect();
    if chars.len() < 4 {
        return full.to_owned();
    }

    let last_four: String = chars[chars.len() - 4..].iter().collect();
    format!("****{last_four}")
}




#[cfg(test)]
mod mask_account_number_tests {
    use super::mask_account_number;

    #[test]
    fn masks_all_but_the_last_four_characters() {
        assert_eq!("****3456", mask_account_number("1234567890123456"));
    }

    #[test]
    fn four_character_numbers_are_still_masked() {
        assert_eq!("****1234", mask_account_number("1234"));
    }

    #[test]
    fn short_numbers_are_returned_unmasked() {
        assert_eq!("123", mask_account_number("123"));
        assert_eq!("", mask_account_number(""));
    }
}
