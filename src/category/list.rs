//! Listing categories with their spending for a month.

use axum::{Extension, Json, extract::State};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::PrimitiveDateTime;
use time_tz::Tz;

use crate::{
    Error,
    category::CategoryState,
    charts::{CategorySortBy, CategorySummary, category_breakdown},
    db::lock_connection,
    ledger_date::reference_date,
    period::{Granularity, Period},
    timezone::{get_timezone, now_local},
    user::UserID,
};

/// The request body for listing categories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryListRequest {
    /// Any date within the month to list. Defaults to the current month.
    pub category_date: Option<String>,
    pub sort_by: CategorySortBy,
    pub limit: Option<usize>,
}

/// The user's categories for the month of `request.category_date` with the
/// amount spent in each.
pub fn list_categories(
    user_id: UserID,
    request: &CategoryListRequest,
    now: PrimitiveDateTime,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    let reference = reference_date(request.category_date.as_deref(), now, local_timezone)?;

    category_breakdown(
        user_id,
        Period::containing(Granularity::Month, reference),
        request.sort_by,
        request.limit,
        local_timezone,
        connection,
    )
}

/// The user's categories from the month before `now`, sorted by name.
pub fn previous_month_categories(
    user_id: UserID,
    now: PrimitiveDateTime,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    category_breakdown(
        user_id,
        Period::previous(Granularity::Month, now),
        CategorySortBy::Category,
        None,
        local_timezone,
        connection,
    )
}

pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<CategoryListRequest>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let categories = list_categories(user_id, &request, now, local_timezone, &connection)?;

    Ok(Json(json!({ "categories": categories })))
}

pub async fn previous_month_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Value>, Error> {
    let local_timezone = get_timezone(&state.local_timezone)?;
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let categories = previous_month_categories(user_id, now, local_timezone, &connection)?;

    Ok(Json(json!({ "categories": categories })))
}
