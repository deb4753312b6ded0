//! Everything for displaying and managing accounts.

mod accounts_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod kpi;
mod store;

pub use accounts_page::{AccountsPageState, DisplayQuery, get_accounts_page};
pub use core::{
    ACCOUNT_TYPES, Account, AccountId, AccountKind, AccountStatus, AccountType,
};
pub use create_endpoint::{CreateAccountState, NewAccountForm, create_account};
pub use create_page::{NewAccountPageState, get_new_account_page};
pub use delete_endpoint::{DeleteAccountState, delete_account};
pub use edit_endpoint::{BalanceForm, UpdateAccountState, update_account};
pub use edit_page::{EditAccountPageState, get_edit_account_page};
pub use kpi::{KpiTotals, compute_kpi_totals, kpi_section};
pub use store::{AccountStore, HttpAccountStore, InMemoryAccountStore};
