//! Soft deleting a category together with its transactions.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    Error,
    category::{CategoryId, CategoryState, delete_category},
    db::lock_connection,
    timezone::now_local,
    user::UserID,
};

pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<impl IntoResponse, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions_deleted = delete_category(user_id, category_id, now, &connection)?;
    tracing::debug!(
        "deleted category {category_id} and {transactions_deleted} of its transactions"
    );

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
