//! The request body shared by create and update, and the create handler.

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Deserializer, de};
use serde_json::json;

use crate::{
    Error,
    category::CategoryId,
    db::lock_connection,
    source::SourceId,
    timezone::now_local,
    transaction::{NewTransaction, TransactionState, TransactionUpdate, create_transaction},
    user::UserID,
};

/// The request body for creating or replacing a transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub amount: f64,
    pub spent_on: String,
    /// Kept exactly as sent and parsed when read.
    pub date: String,
    pub category: CategoryId,
    /// A source ID, or an empty string or null for no source.
    #[serde(default, deserialize_with = "deserialize_optional_source")]
    pub source: Option<SourceId>,
}

impl TransactionRequest {
    pub fn into_new_transaction(
        self,
        user_id: UserID,
        created_at: time::PrimitiveDateTime,
    ) -> NewTransaction {
        NewTransaction {
            user_id,
            amount: self.amount,
            spent_on: self.spent_on,
            date: self.date,
            category_id: self.category,
            source_id: self.source,
            created_at,
        }
    }
}

impl From<TransactionRequest> for TransactionUpdate {
    fn from(request: TransactionRequest) -> Self {
        Self {
            amount: request.amount,
            spent_on: request.spent_on,
            date: request.date,
            category_id: request.category,
            source_id: request.source,
        }
    }
}

fn deserialize_optional_source<'de, D>(deserializer: D) -> Result<Option<SourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSource {
        Id(SourceId),
        Text(String),
    }

    match Option::<RawSource>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSource::Id(id)) => Ok(Some(id)),
        Some(RawSource::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawSource::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid source \"{text}\""))),
    }
}

pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<TransactionRequest>,
) -> Result<impl IntoResponse, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(&request.into_new_transaction(user_id, now), &connection)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction created successfully",
            "transaction": transaction,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        category::insert_category,
        db::initialize,
        test_utils::{create_test_user, new_test_category},
        transaction::{TransactionState, get_transaction},
    };

    use super::{TransactionRequest, create_transaction_endpoint};

    fn parse(body: &str) -> Result<TransactionRequest, serde_json::Error> {
        serde_json::from_str(body)
    }

    #[test]
    fn empty_source_is_none() {
        let request =
            parse(r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1, "source": ""}"#)
                .unwrap();

        assert_eq!(request.source, None);
    }

    #[test]
    fn missing_or_null_source_is_none() {
        let missing =
            parse(r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1}"#)
                .unwrap();
        let null = parse(
            r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1, "source": null}"#,
        )
        .unwrap();

        assert_eq!(missing.source, None);
        assert_eq!(null.source, None);
    }

    #[test]
    fn numeric_source_is_accepted_as_number_or_string() {
        let number = parse(
            r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1, "source": 7}"#,
        )
        .unwrap();
        let string = parse(
            r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1, "source": "7"}"#,
        )
        .unwrap();

        assert_eq!(number.source, Some(7));
        assert_eq!(string.source, Some(7));
    }

    #[test]
    fn non_numeric_source_is_rejected() {
        let result = parse(
            r#"{"amount": 4.5, "spentOn": "Coffee", "date": "2025-06-01", "category": 1, "source": "wallet"}"#,
        );

        assert!(result.is_err());
    }

    fn get_state() -> TransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn creates_transaction() {
        let state = get_state();
        let (user, food) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection, "a@example.com");
            let food = insert_category(
                &new_test_category(user.id, "Food", datetime!(2025-06-01 0:00)),
                &connection,
            )
            .unwrap();
            (user, food)
        };

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user.id),
            Json(TransactionRequest {
                amount: 12.3,
                spent_on: "Lunch".to_owned(),
                date: "2025-06-02".to_owned(),
                category: food.id,
                source: None,
            }),
        )
        .await
        .unwrap()
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let connection = state.db_connection.lock().unwrap();
        let stored: i64 = connection
            .query_row("SELECT id FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        let transaction = get_transaction(user.id, stored, &connection).unwrap();
        assert_eq!(transaction.spent_on, "Lunch");
        assert_eq!(transaction.date, "2025-06-02");
    }

    #[tokio::test]
    async fn rejects_other_users_category() {
        let state = get_state();
        let (other, food) = {
            let connection = state.db_connection.lock().unwrap();
            let owner = create_test_user(&connection, "a@example.com");
            let other = create_test_user(&connection, "b@example.com");
            let food = insert_category(
                &new_test_category(owner.id, "Food", datetime!(2025-06-01 0:00)),
                &connection,
            )
            .unwrap();
            (other, food)
        };

        let result = create_transaction_endpoint(
            State(state),
            Extension(other.id),
            Json(TransactionRequest {
                amount: 12.3,
                spent_on: "Lunch".to_owned(),
                date: "2025-06-02".to_owned(),
                category: food.id,
                source: None,
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCategory(id)) if id == food.id));
    }
}
