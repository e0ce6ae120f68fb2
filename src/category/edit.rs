//! Reading and replacing a single category.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    Error,
    category::{
        Category, CategoryId, CategoryName, CategoryState, CategoryUpdate, PeriodType,
        get_category, update_category,
    },
    db::lock_connection,
    user::UserID,
};

/// The request body for replacing a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub category: String,
    #[serde(default)]
    pub icon: String,
    pub budget: f64,
    pub period_type: PeriodType,
}

impl TryFrom<UpdateCategoryRequest> for CategoryUpdate {
    type Error = Error;

    fn try_from(request: UpdateCategoryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: CategoryName::new(&request.category)?,
            icon: request.icon,
            budget: request.budget,
            period_type: request.period_type,
        })
    }
}

pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(user_id, category_id, &connection).map(Json)
}

pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, Error> {
    let update = CategoryUpdate::try_from(request)?;
    let connection = lock_connection(&state.db_connection)?;

    update_category(user_id, category_id, &update, &connection)?;

    Ok(Json(json!({ "message": "Category updated successfully" })))
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
        category::{CategoryState, PeriodType, insert_category},
        db::initialize,
        test_utils::{create_test_user, new_test_category},
        user::UserID,
    };

    use super::{UpdateCategoryRequest, get_category_endpoint, update_category_endpoint};

    fn get_state() -> CategoryState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let state = get_state();
        let (user, category) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection, "a@example.com");
            let category = insert_category(
                &new_test_category(user.id, "Food", datetime!(2025-06-01 0:00)),
                &connection,
            )
            .unwrap();
            (user, category)
        };

        update_category_endpoint(
            State(state.clone()),
            Extension(user.id),
            Path(category.id),
            Json(UpdateCategoryRequest {
                category: "Groceries".to_owned(),
                icon: "cart".to_owned(),
                budget: 250.0,
                period_type: PeriodType::Monthly,
            }),
        )
        .await
        .unwrap();

        let Json(got) = get_category_endpoint(State(state), Extension(user.id), Path(category.id))
            .await
            .unwrap();
        assert_eq!(got.name.as_ref(), "Groceries");
        assert_eq!(got.icon, "cart");
        assert_eq!(got.budget, 250.0);
        assert_eq!(got.period_type, PeriodType::Monthly);
        assert_eq!(got.created_at, category.created_at);
    }

    #[tokio::test]
    async fn other_users_category_is_not_found() {
        let state = get_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user(&connection, "a@example.com");
            insert_category(
                &new_test_category(user.id, "Food", datetime!(2025-06-01 0:00)),
                &connection,
            )
            .unwrap()
        };

        let result = get_category_endpoint(
            State(state),
            Extension(UserID::new(category.user_id.as_i64() + 1)),
            Path(category.id),
        )
        .await;

        assert!(matches!(result, Err(Error::CategoryNotFound)));
    }

    #[tokio::test]
    async fn update_rejects_blank_name() {
        let state = get_state();

        let result = update_category_endpoint(
            State(state),
            Extension(UserID::new(1)),
            Path(1),
            Json(UpdateCategoryRequest {
                category: "".to_owned(),
                icon: String::new(),
                budget: 1.0,
                period_type: PeriodType::Once,
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::EmptyCategoryName)));
    }
}
