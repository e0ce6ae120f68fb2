//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, log_in_endpoint, register_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_category_endpoint,
        import_categories_endpoint, list_categories_endpoint, previous_month_categories_endpoint,
        update_category_endpoint,
    },
    charts::{
        get_day_transaction_sum, get_last_month_summary, get_month_transaction_sum,
        get_top_categories, get_top_transactions, get_week_transaction_sum,
    },
    email::{resend_verification_endpoint, verify_email_endpoint},
    endpoints,
    logging::logging_middleware,
    profile::{change_password_endpoint, get_profile_endpoint, update_profile_endpoint},
    source::{
        create_source_endpoint, delete_source_endpoint, get_source_endpoint,
        get_sources_endpoint, update_source_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        last_month_amount_endpoint, list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::VERIFY_EMAIL, get(verify_email_endpoint));

    let protected_routes = Router::new()
        .route(
            endpoints::RESEND_VERIFICATION,
            get(resend_verification_endpoint),
        )
        .route(
            endpoints::PROFILE,
            get(get_profile_endpoint).put(update_profile_endpoint),
        )
        .route(
            endpoints::PROFILE_PASSWORD,
            put(change_password_endpoint),
        )
        .route(endpoints::CREATE_CATEGORY, post(create_category_endpoint))
        .route(endpoints::LIST_CATEGORIES, post(list_categories_endpoint))
        .route(
            endpoints::PREVIOUS_MONTH_CATEGORIES,
            get(previous_month_categories_endpoint),
        )
        .route(endpoints::IMPORT_CATEGORIES, post(import_categories_endpoint))
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route(
            endpoints::CREATE_TRANSACTION,
            post(create_transaction_endpoint),
        )
        .route(endpoints::LIST_TRANSACTIONS, post(list_transactions_endpoint))
        .route(endpoints::LAST_MONTH_AMOUNT, post(last_month_amount_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::SOURCES, get(get_sources_endpoint))
        .route(endpoints::CREATE_SOURCE, post(create_source_endpoint))
        .route(
            endpoints::SOURCE,
            get(get_source_endpoint)
                .put(update_source_endpoint)
                .delete(delete_source_endpoint),
        )
        .route(endpoints::CHART_CATEGORIES, post(get_top_categories))
        .route(endpoints::CHART_TRANSACTIONS, post(get_top_transactions))
        .route(endpoints::CHART_DAY_SUM, get(get_day_transaction_sum))
        .route(endpoints::CHART_WEEK_SUM, get(get_week_transaction_sum))
        .route(endpoints::CHART_MONTH_SUM, get(get_month_transaction_sum))
        .route(
            endpoints::CHART_LAST_MONTH_SUMMARY,
            get(get_last_month_summary),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
