//! Spending analytics: window totals, category breakdowns and monthly summaries.

mod aggregation;
mod handlers;

pub use aggregation::{
    CategorySortBy, CategorySummary, PeriodComparison, PeriodSummary, TopTransaction,
    category_breakdown, compare_periods, period_summary, sort_category_summaries, sum_for_window,
    top_transactions,
};
pub use handlers::{
    get_day_transaction_sum, get_last_month_summary, get_month_transaction_sum,
    get_top_categories, get_top_transactions, get_week_transaction_sum,
};
