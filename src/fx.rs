//! Display-time currency conversion through a pivot rate table.
//!
//! A [RateTable] expresses every rate relative to one pivot currency, the way
//! the exchange-rate service returns them. Conversion never mutates stored
//! balances; it produces a new minor-unit amount for presentation only, and
//! reports `None` instead of guessing when a usable rate is missing.

use std::collections::HashMap;

use crate::money::Currency;

/// Exchange rates relative to a pivot currency.
///
/// `rate(c)` is the number of units of `c` per one unit of the pivot. The
/// pivot itself always maps to 1.0. Rates that are zero, negative, or not
/// finite are dropped on construction so they can never reach a division.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pivot: Currency,
    rates: HashMap<Currency, f64>,
}

impl RateTable {
    /// A table with no rates other than the implicit pivot rate of 1.0.
    pub fn empty(pivot: Currency) -> Self {
        Self {
            pivot,
            rates: HashMap::new(),
        }
    }

    /// Build a table from `(currency, rate)` pairs, discarding unusable rates.
    pub fn with_rates(pivot: Currency, rates: impl IntoIterator<Item = (Currency, f64)>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(currency, rate)| *currency != pivot && rate.is_finite() && *rate > 0.0)
            .collect();

        Self { pivot, rates }
    }

    /// The currency the table's rates are expressed against.
    pub fn pivot(&self) -> Currency {
        self.pivot
    }

    /// Units of `currency` per one unit of the pivot, if known and usable.
    pub fn rate(&self, currency: Currency) -> Option<f64> {
        if currency == self.pivot {
            return Some(1.0);
        }

        self.rates.get(&currency).copied()
    }
}

/// Convert a minor-unit amount from one currency to another through the
/// table's pivot.
///
/// The amount is taken to major units, divided by the source rate to reach
/// the pivot, multiplied by the target rate, and rounded back to minor units
/// with the standard round-half-away-from-zero `round`. Returns `None` when
/// either rate is unavailable; the caller must fall back to the unconverted
/// amount or a neutral placeholder.
///
/// Conversion is the identity when `from == to`, whatever the table holds.
pub fn convert_minor(
    amount_minor: i64,
    from: Currency,
    to: Currency,
    table: &RateTable,
) -> Option<i64> {
    if from == to {
        return Some(amount_minor);
    }

    let from_rate = table.rate(from)?;
    let to_rate = table.rate(to)?;

    let from_major = amount_minor as f64 / from.minor_factor() as f64;
    let pivot_major = from_major / from_rate;
    let to_major = pivot_major * to_rate;

    let to_minor = (to_major * to.minor_factor() as f64).round();
    if !to_minor.is_finite() {
        return None;
    }

    Some(to_minor as i64)
}
