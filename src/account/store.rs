//! The account store abstraction.
//!
//! Accounts live in the ledger API, but routes access them through this trait
//! so that page handlers can be tested without a running backend.

use std::{
    future::Future,
    sync::{Arc, Mutex, atomic::{AtomicU64, Ordering}},
};

use crate::{
    Error,
    account::Account,
    auth::AccessToken,
    backend::{BackendClient, NewAccount},
};

/// Read and write access to the user's accounts.
///
/// Every method takes the caller's bearer token since the ledger API scopes
/// accounts to the authenticated user.
pub trait AccountStore: Clone + Send + Sync + 'static {
    /// List all accounts.
    fn list(&self, token: &AccessToken) -> impl Future<Output = Result<Vec<Account>, Error>> + Send;

    /// Create a new account.
    fn create(
        &self,
        token: &AccessToken,
        new_account: &NewAccount,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Overwrite the stored balance of an account, in minor units of the
    /// account's base currency.
    fn set_balance(
        &self,
        token: &AccessToken,
        account_id: &str,
        balance_minor: i64,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Delete an account.
    fn delete(
        &self,
        token: &AccessToken,
        account_id: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// The production [AccountStore], backed by the ledger API.
#[derive(Debug, Clone)]
pub struct HttpAccountStore {
    backend: BackendClient,
}

impl HttpAccountStore {
    /// Create an account store that delegates to `backend`.
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

impl AccountStore for HttpAccountStore {
    async fn list(&self, token: &AccessToken) -> Result<Vec<Account>, Error> {
        self.backend.accounts(token).await
    }

    async fn create(&self, token: &AccessToken, new_account: &NewAccount) -> Result<(), Error> {
        self.backend.create_account(token, new_account).await
    }

    async fn set_balance(
        &self,
        token: &AccessToken,
        account_id: &str,
        balance_minor: i64,
    ) -> Result<(), Error> {
        self.backend
            .update_account_balance(token, account_id, balance_minor)
            .await
    }

    async fn delete(&self, token: &AccessToken, account_id: &str) -> Result<(), Error> {
        self.backend.delete_account(token, account_id).await
    }
}

/// An in-memory [AccountStore] for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<Mutex<Vec<Account>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryAccountStore {
    /// Create a store pre-populated with `accounts`.
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(accounts.len() as u64 + 1)),
            accounts: Arc::new(Mutex::new(accounts)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Account>> {
        // The store is test-only; a poisoned lock means a test already failed.
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AccountStore for InMemoryAccountStore {
    async fn list(&self, _token: &AccessToken) -> Result<Vec<Account>, Error> {
        Ok(self.lock().clone())
    }

    async fn create(&self, _token: &AccessToken, new_account: &NewAccount) -> Result<(), Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let account = new_account.clone().into_account(format!("acct_{id}"));

        self.lock().push(account);

        Ok(())
    }

    async fn set_balance(
        &self,
        _token: &AccessToken,
        account_id: &str,
        balance_minor: i64,
    ) -> Result<(), Error> {
        let mut accounts = self.lock();
        let account = accounts
            .iter_mut()
            .find(|account| account.id == account_id)
            .ok_or_else(|| Error::AccountNotFound(account_id.to_owned()))?;

        account.balance_minor = balance_minor;

        Ok(())
    }

    async fn delete(&self, _token: &AccessToken, account_id: &str) -> Result<(), Error> {
        let mut accounts = self.lock();
        let initial_len = accounts.len();
        accounts.retain(|account| account.id != account_id);

        if accounts.len() == initial_len {
            return Err(Error::AccountNotFound(account_id.to_owned()));
        }

        Ok(())
    }
}
