//! Copying categories from an earlier month into the current one.

use std::collections::HashSet;

use axum::{Extension, Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{
    Error,
    category::{
        CategoryId, CategoryState, NewCategory, PeriodType, category_name_exists_in,
        get_categories_by_ids, insert_categories,
    },
    db::lock_connection,
    period::{Granularity, Period},
    timezone::now_local,
    user::UserID,
};

/// The request body for importing categories: either a bare array of IDs or
/// an object with an `ids` array.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImportCategoriesRequest {
    /// `[1, 2]`
    Ids(Vec<CategoryId>),
    /// `{"ids": [1, 2]}`
    Object {
        #[serde(alias = "categoryIds")]
        ids: Vec<CategoryId>,
    },
}

impl ImportCategoriesRequest {
    /// The IDs of the categories to copy.
    pub fn ids(&self) -> &[CategoryId] {
        match self {
            Self::Ids(ids) | Self::Object { ids } => ids,
        }
    }
}

/// What happened during an import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub message: String,
    /// Set when any category was skipped.
    pub error: bool,
    /// Names skipped because a category with that name already exists this month.
    pub already_created: Vec<String>,
    pub imported: usize,
}

/// Create a one-off category in the month of `now` for each category in
/// `category_ids`, copying its name, icon and budget.
///
/// A category is skipped if the user already has a live category with the
/// same name this month, or if an earlier ID in the same request has the same
/// name. Unknown IDs are ignored.
///
/// The source categories are looked up without checking who owns them.
pub fn import_categories(
    user_id: UserID,
    category_ids: &[CategoryId],
    now: PrimitiveDateTime,
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    let this_month = Period::containing(Granularity::Month, now);
    let mut already_created = Vec::new();
    let mut seen_names = HashSet::new();
    let mut new_categories = Vec::new();

    for category in get_categories_by_ids(category_ids, connection)? {
        if seen_names.contains(&category.name)
            || category_name_exists_in(user_id, &category.name, this_month, connection)?
        {
            already_created.push(category.name.to_string());
            continue;
        }

        seen_names.insert(category.name.clone());
        new_categories.push(NewCategory {
            user_id,
            name: category.name,
            icon: category.icon,
            budget: category.budget,
            period_type: PeriodType::Once,
            created_at: now,
        });
    }

    let imported = insert_categories(&new_categories, connection)?.len();

    let message = if already_created.is_empty() {
        "Categories imported successfully".to_owned()
    } else {
        format!(
            "Categories already created this month: {}",
            already_created.join(", ")
        )
    };

    Ok(ImportSummary {
        message,
        error: !already_created.is_empty(),
        already_created,
        imported,
    })
}

pub async fn import_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<ImportCategoriesRequest>,
) -> Result<Json<ImportSummary>, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    import_categories(user_id, request.ids(), now, &connection).map(Json)
}
