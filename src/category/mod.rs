//! Budget categories: one-off and recurring creation, listing, editing,
//! deletion and importing from an earlier month.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod import;
mod list;

pub use create::{
    CreateCategoryOutcome, CreateCategoryRequest, create_category, create_category_endpoint,
    recurring_period_starts,
};
pub use db::{
    category_name_exists_in, create_category_table, delete_category, get_categories_by_ids,
    get_categories_created_in, get_category, insert_categories, insert_category, update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{
    Category, CategoryId, CategoryName, CategoryUpdate, CreationDuration, NewCategory, PeriodType,
};
pub use edit::{UpdateCategoryRequest, get_category_endpoint, update_category_endpoint};
pub use import::{ImportCategoriesRequest, ImportSummary, import_categories, import_categories_endpoint};
pub use list::{
    CategoryListRequest, list_categories, list_categories_endpoint, previous_month_categories,
    previous_month_categories_endpoint,
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
