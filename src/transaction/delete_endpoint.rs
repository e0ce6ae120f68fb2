use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    db::lock_connection,
    timezone::now_local,
    transaction::{TransactionId, TransactionState, delete_transaction},
    user::UserID,
};

/// Soft delete one of the user's transactions, responding with its ID.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(user_id, transaction_id, now, &connection)?;

    Ok(Json(json!({
        "message": "Transaction deleted successfully",
        "id": transaction_id,
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Json,
        extract::{Path, State},
    };
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        category::insert_category,
        db::initialize,
        test_utils::{create_test_user, insert_test_transaction, new_test_category},
        transaction::{TransactionState, get_transaction},
    };

    use super::delete_transaction_endpoint;

    #[tokio::test]
    async fn deleted_transaction_is_hidden() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user(&connection, "a@example.com");
        let food = insert_category(
            &new_test_category(user.id, "Food", datetime!(2025-06-01 0:00)),
            &connection,
        )
        .unwrap();
        let transaction = insert_test_transaction(&connection, user.id, food.id, 3.0, "2025-06-02");
        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let Json(body) =
            delete_transaction_endpoint(State(state.clone()), Extension(user.id), Path(transaction.id))
                .await
                .unwrap();

        assert_eq!(body["id"], transaction.id);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
    }
}
