//! The HTTP client for the ledger API.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    Error,
    account::Account,
    auth::AccessToken,
    backend::models::{
        AccountRecord, BalanceUpdate, CountRecord, LoginResponse, NewAccount, NewInstitution,
        NewTransaction, ProfileRecord,
    },
    institution::Institution,
    transaction::Transaction,
};

/// A thin client over the ledger API's JSON endpoints.
///
/// Transport failures and unexpected statuses map to
/// [Error::BackendRequest], a 401 maps to [Error::Unauthorized], and
/// undecodable payloads map to [Error::MalformedResponse]; callers decide
/// whether to degrade or redirect.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the ledger API at `base_url`,
    /// e.g. "http://localhost:8080".
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    /// Returns [Error::InvalidCredentials] when the API rejects the
    /// credentials, and [Error::BackendRequest] for transport failures.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<AccessToken, Error> {
        let response = self
            .http_client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({"username": username, "password": password}))
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("POST /auth/login: {error}")))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::InvalidCredentials),
            status if status.is_success() => {
                let payload: LoginResponse = decode(response).await?;
                Ok(AccessToken(payload.access_token))
            }
            status => Err(Error::BackendRequest(format!(
                "POST /auth/login returned status {status}"
            ))),
        }
    }

    /// Fetch the user profile.
    pub async fn profile(&self, token: &AccessToken) -> Result<ProfileRecord, Error> {
        self.get_json(token, "/auth/profile").await
    }

    /// Fetch every account, with balances already netted by the API.
    pub async fn accounts(&self, token: &AccessToken) -> Result<Vec<Account>, Error> {
        let records: Vec<AccountRecord> = self.get_json(token, "/account").await?;

        Ok(records
            .into_iter()
            .map(AccountRecord::into_account)
            .collect())
    }

    /// Create an account.
    pub async fn create_account(
        &self,
        token: &AccessToken,
        account: &NewAccount,
    ) -> Result<(), Error> {
        let response = self
            .http_client
            .post(self.url("/account"))
            .bearer_auth(&token.0)
            .json(account)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("POST /account: {error}")))?;

        expect_success(response, "POST /account").map(|_| ())
    }

    /// Overwrite the stored balance of the account with `account_id`.
    pub async fn update_account_balance(
        &self,
        token: &AccessToken,
        account_id: &str,
        balance_minor: i64,
    ) -> Result<(), Error> {
        let path = format!("/account/{account_id}");
        let response = self
            .http_client
            .patch(self.url(&path))
            .bearer_auth(&token.0)
            .json(&BalanceUpdate { balance_minor })
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("PATCH {path}: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(account_id.to_owned()));
        }

        expect_success(response, &format!("PATCH {path}")).map(|_| ())
    }

    /// Delete the account with `account_id`.
    pub async fn delete_account(&self, token: &AccessToken, account_id: &str) -> Result<(), Error> {
        let path = format!("/account/{account_id}");
        let response = self
            .http_client
            .delete(self.url(&path))
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("DELETE {path}: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(account_id.to_owned()));
        }

        expect_success(response, &format!("DELETE {path}")).map(|_| ())
    }

    /// Fetch every institution.
    pub async fn institutions(&self, token: &AccessToken) -> Result<Vec<Institution>, Error> {
        self.get_json(token, "/institution").await
    }

    /// Create an institution.
    pub async fn create_institution(
        &self,
        token: &AccessToken,
        institution: &NewInstitution,
    ) -> Result<(), Error> {
        let response = self
            .http_client
            .post(self.url("/institution"))
            .bearer_auth(&token.0)
            .json(institution)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("POST /institution: {error}")))?;

        expect_success(response, "POST /institution").map(|_| ())
    }

    /// Fetch the transactions numbered `lower..=upper`, newest first.
    ///
    /// The bounds are one-based positions in the full transaction history,
    /// not IDs.
    pub async fn transactions_range(
        &self,
        token: &AccessToken,
        lower: u64,
        upper: u64,
    ) -> Result<Vec<Transaction>, Error> {
        let path = format!("/transaction/range?lower={lower}&upper={upper}");
        self.get_json(token, &path).await
    }

    /// Count the transactions on record.
    pub async fn transaction_count(&self, token: &AccessToken) -> Result<u64, Error> {
        let record: CountRecord = self.get_json(token, "/transaction/count").await?;
        Ok(record.count)
    }

    /// Create a transaction.
    pub async fn create_transaction(
        &self,
        token: &AccessToken,
        transaction: &NewTransaction,
    ) -> Result<(), Error> {
        let response = self
            .http_client
            .post(self.url("/transaction"))
            .bearer_auth(&token.0)
            .json(transaction)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("POST /transaction: {error}")))?;

        expect_success(response, "POST /transaction").map(|_| ())
    }

    /// Delete the transaction with `transaction_id`.
    pub async fn delete_transaction(
        &self,
        token: &AccessToken,
        transaction_id: &str,
    ) -> Result<(), Error> {
        let path = format!("/transaction/{transaction_id}");
        let response = self
            .http_client
            .delete(self.url(&path))
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("DELETE {path}: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }

        expect_success(response, &format!("DELETE {path}")).map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        path: &str,
    ) -> Result<T, Error> {
        let response = self
            .http_client
            .get(self.url(path))
            .bearer_auth(&token.0)
            .send()
            .await
            .map_err(|error| Error::BackendRequest(format!("GET {path}: {error}")))?;

        let response = expect_success(response, &format!("GET {path}"))?;

        decode(response).await
    }
}

fn expect_success(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, Error> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(Error::BackendRequest(format!(
            "{context} returned status {status}"
        ))),
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    response
        .json()
        .await
        .map_err(|error| Error::MalformedResponse(error.to_string()))
}

#[cfg(test)]
mod backend_client_tests {
    use super::BackendClient;
    use crate::{Error, auth::AccessToken};

    fn unreachable_client() -> BackendClient {
        // Port 9 (discard) is never listening in the test environment.
        BackendClient::new("http://127.0.0.1:9/")
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8080/");

        assert_eq!(client.url("/account"), "http://localhost:8080/account");
    }

    #[tokio::test]
    async fn transport_failure_maps_to_backend_request_error() {
        let client = unreachable_client();
        let token = AccessToken("test-token".to_owned());

        let result = client.accounts(&token).await;

        assert!(
            matches!(result, Err(Error::BackendRequest(_))),
            "want BackendRequest error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn log_in_transport_failure_is_not_invalid_credentials() {
        let client = unreachable_client();

        let result = client.log_in("alice", "hunter2").await;

        assert!(
            matches!(result, Err(Error::BackendRequest(_))),
            "want BackendRequest error, got {result:?}"
        );
    }
}
