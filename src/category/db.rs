//! Database access for categories.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::FromSqlError};
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::domain::{Category, CategoryId, CategoryName, CategoryUpdate, NewCategory, PeriodType},
    period::Period,
    user::UserID,
};

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                icon TEXT NOT NULL,
                budget REAL NOT NULL,
                period_type TEXT NOT NULL,
                created_at TEXT NOT NULL,
                deleted_at TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_category_user_created ON category(user_id, created_at)",
        (),
    )?;

    Ok(())
}

const SELECT_CATEGORY: &str =
    "SELECT id, user_id, name, icon, budget, period_type, created_at FROM category";

/// Insert a single category.
pub fn insert_category(
    new_category: &NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (user_id, name, icon, budget, period_type, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, user_id, name, icon, budget, period_type, created_at",
        )?
        .query_row(
            (
                new_category.user_id.as_i64(),
                new_category.name.as_ref(),
                &new_category.icon,
                new_category.budget,
                new_category.period_type.as_str(),
                new_category.created_at,
            ),
            map_row,
        )
        .map_err(Error::from)
}

/// Insert every category in `new_categories`, or none of them.
pub fn insert_categories(
    new_categories: &[NewCategory],
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let transaction = connection.unchecked_transaction()?;

    let categories = new_categories
        .iter()
        .map(|new_category| insert_category(new_category, &transaction))
        .collect::<Result<Vec<_>, _>>()?;

    transaction.commit()?;

    Ok(categories)
}

/// Get one of the user's live categories.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist, has been
/// deleted, or belongs to another user.
pub fn get_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL"
        ))?
        .query_row((category_id, user_id.as_i64()), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound,
            error => error.into(),
        })
}

/// Get categories by ID regardless of owner or deletion.
///
/// IDs that do not exist are skipped.
pub fn get_categories_by_ids(
    category_ids: &[CategoryId],
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let mut statement = connection.prepare(&format!("{SELECT_CATEGORY} WHERE id = ?1"))?;
    let mut categories = Vec::with_capacity(category_ids.len());

    for category_id in category_ids {
        match statement.query_row([category_id], map_row) {
            Ok(category) => categories.push(category),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                tracing::debug!("skipping unknown category {category_id}");
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(categories)
}

/// Get the user's live categories created within `period`, oldest first.
pub fn get_categories_created_in(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY}
            WHERE user_id = ?1 AND deleted_at IS NULL AND created_at BETWEEN ?2 AND ?3
            ORDER BY created_at ASC, id ASC"
        ))?
        .query_map((user_id.as_i64(), period.start, period.end), map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Whether the user has a live category called `name` created within `period`.
pub fn category_name_exists_in(
    user_id: UserID,
    name: &CategoryName,
    period: Period,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM category
                WHERE user_id = ?1 AND name = ?2 AND deleted_at IS NULL
                    AND created_at BETWEEN ?3 AND ?4
            )",
            (user_id.as_i64(), name.as_ref(), period.start, period.end),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Replace the editable fields of one of the user's live categories.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if there is no such live category owned by the user.
pub fn update_category(
    user_id: UserID,
    category_id: CategoryId,
    update: &CategoryUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, icon = ?2, budget = ?3, period_type = ?4
        WHERE id = ?5 AND user_id = ?6 AND deleted_at IS NULL",
        (
            update.name.as_ref(),
            &update.icon,
            update.budget,
            update.period_type.as_str(),
            category_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Soft delete one of the user's categories and every live transaction in it.
///
/// Both updates happen in one SQLite transaction.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if there is no such live category owned by the user.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    deleted_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction.execute(
        "UPDATE category SET deleted_at = ?1
        WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (deleted_at, category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    let transactions_deleted = transaction.execute(
        "UPDATE \"transaction\" SET deleted_at = ?1
        WHERE category_id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (deleted_at, category_id, user_id.as_i64()),
    )?;

    transaction.commit()?;

    Ok(transactions_deleted)
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_period_type: String = row.get(5)?;
    let period_type = PeriodType::from_str(&raw_period_type).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            Box::new(FromSqlError::Other(error.into())),
        )
    })?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        icon: row.get(3)?,
        budget: row.get(4)?,
        period_type,
        created_at: row.get(6)?,
    })
}
