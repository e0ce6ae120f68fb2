//! Transactions: recording, listing, editing and soft deleting expenses.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;

pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionUpdate, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, map_transaction_row,
    reconcile_orphaned_transactions, update_transaction,
};
pub use create_endpoint::{TransactionRequest, create_transaction_endpoint};
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::{get_transaction_endpoint, update_transaction_endpoint};
pub use list_endpoint::{LastMonthAmountRequest, last_month_amount_endpoint, list_transactions_endpoint};
pub use query::{
    CategoryRef, SourceRef, TransactionFilter, TransactionListing, TransactionQuery,
    TransactionSortBy, list_transactions, query_transactions, truncate_to_limit,
};

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
