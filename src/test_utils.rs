//! Fixtures shared by the unit tests.

#![allow(missing_docs)]

use std::sync::Arc;

use axum_test::TestServer;
use rusqlite::Connection;
use time::{PrimitiveDateTime, macros::datetime};
use time_tz::Tz;

use crate::{
    AppState,
    auth::PasswordHash,
    build_router,
    category::{CategoryId, CategoryName, NewCategory, PeriodType},
    email::RecordingMailer,
    timezone::get_timezone,
    transaction::{NewTransaction, Transaction, create_transaction},
    user::{NewUser, User, UserID, create_user, parse_email},
};

/// The password of users made by [create_test_user].
pub const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// The timezone most tests read dates in.
pub fn utc() -> &'static Tz {
    get_timezone("Etc/UTC").unwrap()
}

/// Insert an unverified user with [TEST_PASSWORD].
pub fn create_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        NewUser {
            email: parse_email(email).unwrap(),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, 4).unwrap(),
            name: "Test User".to_owned(),
            budget: 1000.0,
            created_at: datetime!(2025-01-01 0:00),
        },
        connection,
    )
    .unwrap()
}

/// A one-off category with a budget of 100.
pub fn new_test_category(user_id: UserID, name: &str, created_at: PrimitiveDateTime) -> NewCategory {
    NewCategory {
        user_id,
        name: CategoryName::new_unchecked(name),
        icon: "tag".to_owned(),
        budget: 100.0,
        period_type: PeriodType::Once,
        created_at,
    }
}

/// Insert a transaction with no source, recorded on 1 January 2025.
#[track_caller]
pub fn insert_test_transaction(
    connection: &Connection,
    user_id: UserID,
    category_id: CategoryId,
    amount: f64,
    date: &str,
) -> Transaction {
    create_transaction(
        &NewTransaction {
            user_id,
            amount,
            spent_on: format!("test purchase of {amount}"),
            date: date.to_owned(),
            category_id,
            source_id: None,
            created_at: datetime!(2025-01-01 0:00),
        },
        connection,
    )
    .unwrap()
}

/// A server for the whole app backed by an in-memory database.
///
/// Emails are kept in the returned mailer.
pub fn get_test_server() -> (TestServer, RecordingMailer) {
    let mailer = RecordingMailer::default();
    let state = AppState::new(
        Connection::open_in_memory().unwrap(),
        "test secret",
        "Etc/UTC",
        Arc::new(mailer.clone()),
        "http://localhost:5173",
    )
    .unwrap()
    .with_password_cost(4);

    let server = TestServer::new(build_router(state));

    (server, mailer)
}
