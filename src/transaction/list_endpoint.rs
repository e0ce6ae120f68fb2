//! Handlers for listing transactions and last month's total.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    charts::sum_for_window,
    db::lock_connection,
    ledger_date::reference_date,
    period::{Granularity, Period},
    timezone::{get_timezone, now_local},
    transaction::{TransactionQuery, TransactionState, list_transactions},
    user::UserID,
};

pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(query): Json<TransactionQuery>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions = list_transactions(user_id, &query, now, local_timezone, &connection)?;

    Ok(Json(json!({ "transactions": transactions })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LastMonthAmountRequest {
    /// Any date in the month after the one to total. Defaults to now.
    pub date: Option<String>,
}

/// The total spent in the month before the month of `date`.
pub async fn last_month_amount_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<LastMonthAmountRequest>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let reference = reference_date(request.date.as_deref(), now, local_timezone)?;
    let last_month = Period::previous(Granularity::Month, reference);
    let connection = lock_connection(&state.db_connection)?;

    let last_month_amount = sum_for_window(user_id, last_month, local_timezone, &connection)?;

    Ok(Json(json!({ "lastMonthAmount": last_month_amount })))
}
