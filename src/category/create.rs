//! Creating one-off and recurring categories.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use time::{Date, Month, PrimitiveDateTime};

use crate::{
    Error,
    category::{
        Category, CategoryName, CategoryState, CreationDuration, NewCategory, PeriodType,
        category_name_exists_in, insert_categories, insert_category,
    },
    db::lock_connection,
    period::{Granularity, Period, add_months, month_period, year_end},
    timezone::now_local,
    user::UserID,
};

/// The request body for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    /// The category name.
    pub category: String,
    /// The name of the icon shown next to the category.
    #[serde(default)]
    pub icon: String,
    /// The amount budgeted per period.
    pub budget: f64,
    /// How often the budget repeats.
    pub period_type: PeriodType,
    /// The month (1-12) of the current year the first recurring record starts in.
    pub start_month: Option<u8>,
    /// How far ahead recurring records are generated.
    #[serde(default)]
    pub creation_duration: CreationDuration,
}

/// The result of [create_category].
#[derive(Debug, Clone, PartialEq)]
pub enum CreateCategoryOutcome {
    /// The categories that were inserted, one per period.
    Created(Vec<Category>),
    /// A one-off category with the same name already exists this month.
    /// Nothing was inserted.
    AlreadyExists,
}

/// The start of every period a recurring category should be generated for.
///
/// Generation begins on the first of `start_month` in the year of `now` and
/// steps by `cadence_months`. It stops before the first day of the month
/// twelve months after the current one, or after 31 December for
/// [CreationDuration::YearEnd].
pub fn recurring_period_starts(
    cadence_months: u32,
    start_month: Month,
    creation_duration: CreationDuration,
    now: PrimitiveDateTime,
) -> Vec<PrimitiveDateTime> {
    let first = month_period(now.year(), start_month).start.date();
    let end = match creation_duration {
        CreationDuration::Next12Months => {
            let current_month = month_period(now.year(), now.month()).start.date();
            add_months(current_month, 12).midnight()
        }
        CreationDuration::YearEnd => year_end(now.year()),
    };

    let mut starts = Vec::new();
    let mut period_start: Date = first;

    while period_start.midnight() < end {
        starts.push(period_start.midnight());
        period_start = add_months(period_start, cadence_months);
    }

    starts
}

/// Create a category for the user.
///
/// A one-off category is created with `now` as its creation time, unless the
/// user already has a live category with the same name this month. Recurring
/// categories are created once per period with no duplicate check.
///
/// # Errors
///
/// Returns an error if the name is empty, a recurring category has no valid
/// start month, or the database fails.
pub fn create_category(
    user_id: UserID,
    request: &CreateCategoryRequest,
    now: PrimitiveDateTime,
    connection: &Connection,
) -> Result<CreateCategoryOutcome, Error> {
    let name = CategoryName::new(&request.category)?;

    let Some(cadence_months) = request.period_type.cadence_months() else {
        let this_month = Period::containing(Granularity::Month, now);
        if category_name_exists_in(user_id, &name, this_month, connection)? {
            return Ok(CreateCategoryOutcome::AlreadyExists);
        }

        let category = insert_category(
            &NewCategory {
                user_id,
                name,
                icon: request.icon.clone(),
                budget: request.budget,
                period_type: PeriodType::Once,
                created_at: now,
            },
            connection,
        )?;

        return Ok(CreateCategoryOutcome::Created(vec![category]));
    };

    let start_month = request
        .start_month
        .and_then(|month| Month::try_from(month).ok())
        .ok_or(Error::InvalidStartMonth(request.start_month))?;

    let new_categories: Vec<NewCategory> =
        recurring_period_starts(cadence_months, start_month, request.creation_duration, now)
            .into_iter()
            .map(|created_at| NewCategory {
                user_id,
                name: name.clone(),
                icon: request.icon.clone(),
                budget: request.budget,
                period_type: request.period_type,
                created_at,
            })
            .collect();

    insert_categories(&new_categories, connection).map(CreateCategoryOutcome::Created)
}

pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Response, Error> {
    let now = now_local(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let response = match create_category(user_id, &request, now, &connection)? {
        CreateCategoryOutcome::AlreadyExists => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "Category already exists" })),
        )
            .into_response(),
        CreateCategoryOutcome::Created(categories) if request.period_type == PeriodType::Once => {
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Category created successfully",
                    "categories": categories,
                })),
            )
                .into_response()
        }
        CreateCategoryOutcome::Created(categories) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{} Categories created successfully", categories.len()),
                "categories": categories,
            })),
        )
            .into_response(),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{
        Month,
        macros::{date, datetime},
    };

    use crate::{
        Error,
        category::{CreationDuration, PeriodType, get_categories_created_in},
        db::initialize,
        period::{Granularity, Period, add_months},
        test_utils::create_test_user,
    };

    use super::{
        CreateCategoryOutcome, CreateCategoryRequest, create_category, recurring_period_starts,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn request(period_type: PeriodType) -> CreateCategoryRequest {
        CreateCategoryRequest {
            category: "Food".to_owned(),
            icon: "utensils".to_owned(),
            budget: 400.0,
            period_type,
            start_month: None,
            creation_duration: CreationDuration::Next12Months,
        }
    }

    #[test]
    fn monthly_from_march_for_next_12_months_makes_12_periods() {
        let starts = recurring_period_starts(
            1,
            Month::March,
            CreationDuration::Next12Months,
            datetime!(2025-03-20 15:45),
        );

        assert_eq!(starts.len(), 12);
        for (i, start) in starts.iter().enumerate() {
            assert_eq!(start.date(), add_months(date!(2025-03-01), i as u32));
            assert_eq!(start.time(), time::Time::MIDNIGHT);
        }
    }

    #[test]
    fn quarterly_until_year_end() {
        let starts = recurring_period_starts(
            3,
            Month::January,
            CreationDuration::YearEnd,
            datetime!(2025-06-20 9:00),
        );

        let dates: Vec<_> = starts.iter().map(|start| start.date()).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025-01-01),
                date!(2025-04-01),
                date!(2025-07-01),
                date!(2025-10-01)
            ]
        );
    }

    #[test]
    fn annual_and_half_yearly_cadences() {
        let now = datetime!(2025-06-20 9:00);

        let annual = recurring_period_starts(12, Month::January, CreationDuration::Next12Months, now);
        let half_yearly =
            recurring_period_starts(6, Month::December, CreationDuration::YearEnd, now);

        assert_eq!(
            annual.iter().map(|s| s.date()).collect::<Vec<_>>(),
            vec![date!(2025-01-01), date!(2026-01-01)]
        );
        assert_eq!(
            half_yearly.iter().map(|s| s.date()).collect::<Vec<_>>(),
            vec![date!(2025-12-01)]
        );
    }

    #[test]
    fn once_category_conflicts_within_the_same_month() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-06-10 12:00);

        let first = create_category(user.id, &request(PeriodType::Once), now, &connection).unwrap();
        let second = create_category(
            user.id,
            &request(PeriodType::Once),
            datetime!(2025-06-28 8:00),
            &connection,
        )
        .unwrap();

        assert!(matches!(first, CreateCategoryOutcome::Created(ref c) if c.len() == 1));
        assert_eq!(second, CreateCategoryOutcome::AlreadyExists);
        let stored = get_categories_created_in(
            user.id,
            Period::containing(Granularity::Month, now),
            &connection,
        )
        .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn once_category_can_be_reused_next_month() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");

        create_category(
            user.id,
            &request(PeriodType::Once),
            datetime!(2025-06-10 12:00),
            &connection,
        )
        .unwrap();
        let july = create_category(
            user.id,
            &request(PeriodType::Once),
            datetime!(2025-07-01 0:00),
            &connection,
        )
        .unwrap();

        assert!(matches!(july, CreateCategoryOutcome::Created(_)));
    }

    #[test]
    fn recurring_creation_stores_one_record_per_period() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let mut monthly = request(PeriodType::Monthly);
        monthly.start_month = Some(3);

        let outcome =
            create_category(user.id, &monthly, datetime!(2025-03-05 10:00), &connection).unwrap();

        let CreateCategoryOutcome::Created(categories) = outcome else {
            panic!("want categories to be created, got {outcome:?}");
        };
        assert_eq!(categories.len(), 12);
        assert_eq!(categories[0].created_at, datetime!(2025-03-01 0:00));
        assert_eq!(categories[11].created_at, datetime!(2026-02-01 0:00));
        assert!(categories.iter().all(|c| c.period_type == PeriodType::Monthly));
    }

    #[test]
    fn recurring_creation_skips_duplicate_check() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-12-05 10:00);
        create_category(user.id, &request(PeriodType::Once), now, &connection).unwrap();
        let mut annual = request(PeriodType::Annually);
        annual.start_month = Some(12);
        annual.creation_duration = CreationDuration::YearEnd;

        let outcome = create_category(user.id, &annual, now, &connection).unwrap();

        assert!(matches!(outcome, CreateCategoryOutcome::Created(ref c) if c.len() == 1));
    }

    #[test]
    fn recurring_creation_requires_a_valid_start_month() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = datetime!(2025-03-05 10:00);
        let mut monthly = request(PeriodType::Monthly);

        assert_eq!(
            create_category(user.id, &monthly, now, &connection),
            Err(Error::InvalidStartMonth(None))
        );

        monthly.start_month = Some(13);

        assert_eq!(
            create_category(user.id, &monthly, now, &connection),
            Err(Error::InvalidStartMonth(Some(13)))
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let mut blank = request(PeriodType::Once);
        blank.category = "  ".to_owned();

        assert_eq!(
            create_category(user.id, &blank, datetime!(2025-03-05 10:00), &connection),
            Err(Error::EmptyCategoryName)
        );
    }
}
