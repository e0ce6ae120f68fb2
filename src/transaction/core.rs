//! Transaction model and database functions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::{CategoryId, get_category},
    database_id::DatabaseId,
    ledger_date::wall_clock,
    source::{SourceId, get_source},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

pub type TransactionId = DatabaseId;

/// An expense (or refund, if negative) recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(skip)]
    pub user_id: UserID,
    pub amount: f64,
    /// What the money was spent on.
    pub spent_on: String,
    /// The date exactly as the client sent it.
    pub date: String,
    #[serde(rename = "category")]
    pub category_id: CategoryId,
    #[serde(rename = "source")]
    pub source_id: Option<SourceId>,
    #[serde(with = "wall_clock")]
    pub created_at: PrimitiveDateTime,
    #[serde(with = "wall_clock")]
    pub updated_at: PrimitiveDateTime,
}

/// The fields needed to insert a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user recording the transaction.
    pub user_id: UserID,
    /// The amount spent. Refunds are negative.
    pub amount: f64,
    /// What the money was spent on.
    pub spent_on: String,
    /// The date of the purchase, stored as given.
    pub date: String,
    /// One of the user's live categories.
    pub category_id: CategoryId,
    /// One of the user's live sources, if any.
    pub source_id: Option<SourceId>,
    /// When the transaction was recorded.
    pub created_at: PrimitiveDateTime,
}

/// The fields replaced when a transaction is edited.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    pub amount: f64,
    pub spent_on: String,
    pub date: String,
    pub category_id: CategoryId,
    pub source_id: Option<SourceId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                spent_on TEXT NOT NULL,
                date TEXT NOT NULL,
                category_id INTEGER NOT NULL,
                source_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
                FOREIGN KEY(source_id) REFERENCES source(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_category ON \"transaction\"(user_id, category_id)",
        (),
    )?;

    Ok(())
}

const SELECT_TRANSACTION: &str = "SELECT id, user_id, amount, spent_on, date, category_id, source_id, created_at, updated_at FROM \"transaction\"";

/// Check that the category and source belong to the user and are not deleted.
fn check_references(
    user_id: UserID,
    category_id: CategoryId,
    source_id: Option<SourceId>,
    connection: &Connection,
) -> Result<(), Error> {
    match get_category(user_id, category_id, connection) {
        Ok(_) => {}
        Err(Error::CategoryNotFound) => return Err(Error::InvalidCategory(category_id)),
        Err(error) => return Err(error),
    }

    if let Some(source_id) = source_id {
        match get_source(user_id, source_id, connection) {
            Ok(_) => {}
            Err(Error::SourceNotFound) => return Err(Error::InvalidSource(source_id)),
            Err(error) => return Err(error),
        }
    }

    Ok(())
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category is not one of the user's live categories,
/// - [Error::InvalidSource] if a source is given that is not one of the user's live sources,
/// - [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_references(
        new_transaction.user_id,
        new_transaction.category_id,
        new_transaction.source_id,
        connection,
    )?;

    connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, amount, spent_on, date, category_id, source_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING id, user_id, amount, spent_on, date, category_id, source_id, created_at, updated_at",
        )?
        .query_row(
            (
                new_transaction.user_id.as_i64(),
                new_transaction.amount,
                &new_transaction.spent_on,
                &new_transaction.date,
                new_transaction.category_id,
                new_transaction.source_id,
                new_transaction.created_at,
            ),
            map_transaction_row,
        )
        .map_err(Error::from)
}

/// Retrieve one of the user's live transactions.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist, is
/// deleted, or belongs to another user.
pub fn get_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
        ))?
        .query_row((transaction_id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
            error => error.into(),
        })
}

/// Replace the editable fields of one of the user's live transactions.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no such transaction, and
/// the same reference errors as [create_transaction].
pub fn update_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    update: &TransactionUpdate,
    updated_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_transaction(user_id, transaction_id, connection)?;
    check_references(user_id, update.category_id, update.source_id, connection)?;

    connection.execute(
        "UPDATE \"transaction\"
        SET amount = ?1, spent_on = ?2, date = ?3, category_id = ?4, source_id = ?5, updated_at = ?6
        WHERE id = ?7 AND user_id = ?8 AND deleted_at IS NULL",
        (
            update.amount,
            &update.spent_on,
            &update.date,
            update.category_id,
            update.source_id,
            updated_at,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    get_transaction(user_id, transaction_id, connection)
}

/// Soft delete one of the user's transactions.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no such live transaction.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    deleted_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET deleted_at = ?1
        WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (deleted_at, transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Soft delete live transactions whose category has already been soft deleted.
///
/// Each repaired transaction takes its category's deletion time. Returns the
/// number of transactions repaired.
pub fn reconcile_orphaned_transactions(connection: &Connection) -> Result<usize, Error> {
    let repaired = connection.execute(
        "UPDATE \"transaction\"
        SET deleted_at = (SELECT category.deleted_at FROM category WHERE category.id = category_id)
        WHERE deleted_at IS NULL
            AND category_id IN (SELECT id FROM category WHERE deleted_at IS NOT NULL)",
        (),
    )?;

    if repaired > 0 {
        tracing::warn!("Soft deleted {repaired} transactions left behind by deleted categories");
    }

    Ok(repaired)
}

pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        spent_on: row.get(3)?,
        date: row.get(4)?,
        category_id: row.get(5)?,
        source_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
