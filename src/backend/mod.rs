//! Client for the external ledger API.
//!
//! All account, institution, and transaction data lives behind this API; the
//! web app holds no database of its own. Every request after log-in carries
//! the bearer token from the session cookie.

mod client;
mod models;

pub use client::BackendClient;
pub use models::{
    AccountRecord, BalanceUpdate, CountRecord, LoginResponse, NewAccount, NewInstitution,
    NewTransaction, ProfileRecord,
};
