//! Client for the third-party exchange-rate service.
//!
//! The service returns every rate relative to a requested pivot currency in
//! one response. It is treated as best-effort: any transport failure, bad
//! status, or unusable payload collapses into [Error::RateUnavailable] and
//! the caller renders its fallback state. There is no retry.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, fx::RateTable, money::Currency};

/// HTTP client for an open.er-api.com style rate endpoint.
#[derive(Debug, Clone)]
pub struct RateClient {
    http_client: Client,
    base_url: String,
}

/// The subset of the rate service response the converter needs.
#[derive(Debug, Deserialize)]
struct RateResponse {
    rates: HashMap<String, f64>,
}

impl RateClient {
    /// Create a client for the rate service at `base_url`,
    /// e.g. "https://open.er-api.com".
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Fetch the latest rates with `pivot` as the base currency.
    ///
    /// # Errors
    /// Returns [Error::RateUnavailable] for any failure; the detail is logged
    /// here rather than surfaced, since every caller degrades the same way.
    pub async fn fetch(&self, pivot: Currency) -> Result<RateTable, Error> {
        let url = format!("{}/v6/latest/{}", self.base_url, pivot.code());

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|error| {
                tracing::warn!("could not reach the rate service: {error}");
                Error::RateUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!("rate service returned status {}", response.status());
            return Err(Error::RateUnavailable);
        }

        let payload: RateResponse = response.json().await.map_err(|error| {
            tracing::warn!("could not parse rate service response: {error}");
            Error::RateUnavailable
        })?;

        Ok(build_rate_table(pivot, payload))
    }
}

/// Turn a raw rate response into a [RateTable].
///
/// Codes the app does not support are skipped; zero and negative rates are
/// dropped by the table itself. An absent expected currency therefore shows
/// up later as "conversion unavailable", never as a crash.
fn build_rate_table(pivot: Currency, response: RateResponse) -> RateTable {
    let rates = response.rates.into_iter().filter_map(|(code, rate)| {
        let currency = Currency::from_code(&code).ok()?;
        Some((currency, rate))
    });

    RateTable::with_rates(pivot, rates)
}
