//! Handlers for reading and replacing a single transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    db::lock_connection,
    timezone::now_local,
    transaction::{
        Transaction, TransactionId, TransactionRequest, TransactionState, TransactionUpdate,
        get_transaction, update_transaction,
    },
    user::UserID,
};

pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(user_id, transaction_id, &connection).map(Json)
}

pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Json(request): Json<TransactionRequest>,
) -> Result<Json<Value>, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = update_transaction(
        user_id,
        transaction_id,
        &TransactionUpdate::from(request),
        now,
        &connection,
    )?;

    Ok(Json(json!({
        "message": "Transaction updated successfully",
        "transaction": transaction,
    })))
}
