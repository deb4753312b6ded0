//! Everything for displaying and recording transactions.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod row;
mod transactions_page;

pub use core::{Direction, Line, TRANSACTION_KINDS, Transaction};
pub use create_endpoint::{CreateTransactionState, NewTransactionForm, create_transaction};
pub use delete_endpoint::{DeleteTransactionState, delete_transaction};
pub use row::{Overall, RowFilter, TransactionRow, UNRESOLVED, project_row};
pub use transactions_page::{TransactionsPageState, WindowQuery, get_transactions_page};
