//! Database access for payment sources.

use rusqlite::{Connection, Row};
use time::PrimitiveDateTime;

use crate::{
    Error,
    source::domain::{Source, SourceId, SourceName},
    user::UserID,
};

pub fn create_source_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS source (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                deleted_at TEXT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a source for the user.
///
/// The duplicate check covers every source the user has ever created,
/// including deleted ones, so a deleted name cannot be reused.
///
/// # Errors
///
/// Returns [Error::DuplicateSource] if the user already has a source called `name`.
pub fn create_source(
    user_id: UserID,
    name: &SourceName,
    created_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<Source, Error> {
    let exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM source WHERE user_id = ?1 AND name = ?2)",
        (user_id.as_i64(), name.as_ref()),
        |row| row.get(0),
    )?;

    if exists {
        return Err(Error::DuplicateSource);
    }

    connection
        .prepare(
            "INSERT INTO source (user_id, name, created_at) VALUES (?1, ?2, ?3)
            RETURNING id, user_id, name, created_at",
        )?
        .query_row((user_id.as_i64(), name.as_ref(), created_at), map_row)
        .map_err(Error::from)
}

/// Get one of the user's live sources.
///
/// # Errors
///
/// Returns [Error::SourceNotFound] if the source does not exist, is deleted,
/// or belongs to another user.
pub fn get_source(
    user_id: UserID,
    source_id: SourceId,
    connection: &Connection,
) -> Result<Source, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, created_at FROM source
            WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL",
        )?
        .query_row((source_id, user_id.as_i64()), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::SourceNotFound,
            error => error.into(),
        })
}

/// Get all of the user's live sources ordered by name.
pub fn get_sources(user_id: UserID, connection: &Connection) -> Result<Vec<Source>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, created_at FROM source
            WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY name ASC",
        )?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_source| maybe_source.map_err(Error::from))
        .collect()
}

/// Rename one of the user's live sources.
///
/// # Errors
///
/// Returns [Error::SourceNotFound] if there is no such live source.
pub fn update_source(
    user_id: UserID,
    source_id: SourceId,
    name: &SourceName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE source SET name = ?1 WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (name.as_ref(), source_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::SourceNotFound);
    }

    Ok(())
}

/// Soft delete one of the user's sources.
///
/// Transactions keep their reference to the source.
///
/// # Errors
///
/// Returns [Error::SourceNotFound] if there is no such live source.
pub fn delete_source(
    user_id: UserID,
    source_id: SourceId,
    deleted_at: PrimitiveDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE source SET deleted_at = ?1 WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (deleted_at, source_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::SourceNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Source, rusqlite::Error> {
    let raw_name: String = row.get(2)?;

    Ok(Source {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: SourceName::new_unchecked(&raw_name),
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{Error, db::initialize, test_utils::create_test_user};

    use super::{
        SourceName, create_source, delete_source, get_source, get_sources, update_source,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn create_and_list_sources_by_name() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-06-01 9:00);
        let credit = create_source(user.id, &SourceName::new_unchecked("Credit"), now, &connection)
            .unwrap();
        let cash =
            create_source(user.id, &SourceName::new_unchecked("Cash"), now, &connection).unwrap();

        assert_eq!(get_sources(user.id, &connection), Ok(vec![cash, credit]));
    }

    #[test]
    fn duplicate_name_is_rejected_even_after_delete() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-06-01 9:00);
        let name = SourceName::new_unchecked("Cash");
        let cash = create_source(user.id, &name, now, &connection).unwrap();

        assert_eq!(
            create_source(user.id, &name, now, &connection),
            Err(Error::DuplicateSource)
        );

        delete_source(user.id, cash.id, now, &connection).unwrap();

        assert_eq!(
            create_source(user.id, &name, now, &connection),
            Err(Error::DuplicateSource)
        );
    }

    #[test]
    fn same_name_is_allowed_for_different_users() {
        let connection = get_test_connection();
        let first = create_test_user(&connection, "a@example.com");
        let second = create_test_user(&connection, "b@example.com");
        let now = datetime!(2025-06-01 9:00);
        let name = SourceName::new_unchecked("Cash");

        create_source(first.id, &name, now, &connection).unwrap();

        assert!(create_source(second.id, &name, now, &connection).is_ok());
    }

    #[test]
    fn update_renames_source() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-06-01 9:00);
        let cash =
            create_source(user.id, &SourceName::new_unchecked("Cash"), now, &connection).unwrap();

        update_source(user.id, cash.id, &SourceName::new_unchecked("Wallet"), &connection)
            .unwrap();

        let got = get_source(user.id, cash.id, &connection).unwrap();
        assert_eq!(got.name.as_ref(), "Wallet");
    }

    #[test]
    fn other_users_cannot_touch_source() {
        let connection = get_test_connection();
        let owner = create_test_user(&connection, "a@example.com");
        let other = create_test_user(&connection, "b@example.com");
        let now = datetime!(2025-06-01 9:00);
        let cash =
            create_source(owner.id, &SourceName::new_unchecked("Cash"), now, &connection).unwrap();

        assert_eq!(
            get_source(other.id, cash.id, &connection),
            Err(Error::SourceNotFound)
        );
        assert_eq!(
            update_source(other.id, cash.id, &SourceName::new_unchecked("x"), &connection),
            Err(Error::SourceNotFound)
        );
        assert_eq!(
            delete_source(other.id, cash.id, now, &connection),
            Err(Error::SourceNotFound)
        );
    }

    #[test]
    fn empty_source_name_is_rejected() {
        assert_eq!(SourceName::new("   "), Err(Error::EmptySourceName));
    }
}
