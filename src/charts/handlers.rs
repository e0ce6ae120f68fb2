//! HTTP handlers for the chart data endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    charts::{
        CategorySortBy, PeriodComparison, PeriodSummary, category_breakdown, compare_periods,
        period_summary, top_transactions,
    },
    db::lock_connection,
    ledger_date::reference_date,
    period::{Granularity, Period},
    timezone::{get_timezone, now_local},
    user::UserID,
};

/// The state needed by the chart endpoints.
#[derive(Debug, Clone)]
pub struct ChartsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopCategoriesRequest {
    pub category_date: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopTransactionsRequest {
    pub month: Option<String>,
    pub limit: Option<usize>,
}

/// Categories for the month of `categoryDate`, biggest spenders first.
pub async fn get_top_categories(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<TopCategoriesRequest>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let reference = reference_date(request.category_date.as_deref(), now, local_timezone)?;
    let month = Period::containing(Granularity::Month, reference);
    let connection = lock_connection(&state.db_connection)?;

    let categories = category_breakdown(
        user_id,
        month,
        CategorySortBy::AmountSpent,
        request.limit,
        local_timezone,
        &connection,
    )?;

    Ok(Json(json!({ "categories": categories })))
}

/// The largest positive transactions in the month of `month`.
pub async fn get_top_transactions(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<TopTransactionsRequest>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let reference = reference_date(request.month.as_deref(), now, local_timezone)?;
    let month = Period::containing(Granularity::Month, reference);
    let connection = lock_connection(&state.db_connection)?;

    let transactions =
        top_transactions(user_id, month, request.limit, local_timezone, &connection)?;

    Ok(Json(json!({ "transactions": transactions })))
}

async fn transaction_sum(
    state: ChartsState,
    user_id: UserID,
    granularity: Granularity,
) -> Result<Json<PeriodComparison>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    compare_periods(user_id, granularity, now, local_timezone, &connection).map(Json)
}

pub async fn get_day_transaction_sum(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<PeriodComparison>, Error> {
    transaction_sum(state, user_id, Granularity::Day).await
}

pub async fn get_week_transaction_sum(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<PeriodComparison>, Error> {
    transaction_sum(state, user_id, Granularity::Week).await
}

pub async fn get_month_transaction_sum(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<PeriodComparison>, Error> {
    transaction_sum(state, user_id, Granularity::Month).await
}

/// Totals and averages for the month before the current one.
pub async fn get_last_month_summary(
    State(state): State<ChartsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<PeriodSummary>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let last_month = Period::previous(Granularity::Month, now_local(&state.local_timezone)?);
    let connection = lock_connection(&state.db_connection)?;

    period_summary(user_id, last_month, local_timezone, &connection).map(Json)
}
