//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The route for registering a new user.
pub const REGISTER: &str = "/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/login";
/// The route for following an email verification link.
pub const VERIFY_EMAIL: &str = "/email/verify/{token}";
/// The route for requesting another verification email.
pub const RESEND_VERIFICATION: &str = "/email/resend";

/// The route to view or edit the user's profile.
pub const PROFILE: &str = "/profile";
/// The route to change the user's password.
pub const PROFILE_PASSWORD: &str = "/profile/password";

/// The route to create a category.
pub const CREATE_CATEGORY: &str = "/categories/create";
/// The route to list a month of categories.
pub const LIST_CATEGORIES: &str = "/categories/get";
/// The route to list last month's categories.
pub const PREVIOUS_MONTH_CATEGORIES: &str = "/categories/previous-month";
/// The route to copy categories into the current month.
pub const IMPORT_CATEGORIES: &str = "/categories/import-from-last-month";
/// The route to get, update or delete a single category.
pub const CATEGORY: &str = "/categories/{category_id}";

/// The route to create a transaction.
pub const CREATE_TRANSACTION: &str = "/transaction/add";
/// The route to list a month of transactions.
pub const LIST_TRANSACTIONS: &str = "/transaction/get";
/// The route for the total spent last month.
pub const LAST_MONTH_AMOUNT: &str = "/transaction/lastMonthTransactionsAmount";
/// The route to get, update or delete a single transaction.
pub const TRANSACTION: &str = "/transaction/{transaction_id}";

/// The route to list sources.
pub const SOURCES: &str = "/sources";
/// The route to create a source.
pub const CREATE_SOURCE: &str = "/sources/create";
/// The route to get, update or delete a single source.
pub const SOURCE: &str = "/sources/{source_id}";

/// The route for the categories with the most spending.
pub const CHART_CATEGORIES: &str = "/charts/getCategories";
/// The route for the largest transactions.
pub const CHART_TRANSACTIONS: &str = "/charts/getTransactions";
/// The route comparing spending today with yesterday.
pub const CHART_DAY_SUM: &str = "/charts/DayTransactionSum";
/// The route comparing spending this week with last week.
pub const CHART_WEEK_SUM: &str = "/charts/weekTransactionSum";
/// The route comparing spending this month with last month.
pub const CHART_MONTH_SUM: &str = "/charts/monthTransactionSum";
/// The route for last month's totals and averages.
pub const CHART_LAST_MONTH_SUMMARY: &str = "/charts/lastMonthSummary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
