//! Database initialisation and connection helpers.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    category::create_category_table,
    source::create_source_table,
    transaction::{create_transaction_table, reconcile_orphaned_transactions},
    user::create_user_table,
};

/// Create the tables for every model if they do not already exist, then
/// repair any transactions left behind by an interrupted category delete.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_source_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    reconcile_orphaned_transactions(connection)?;

    Ok(())
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
