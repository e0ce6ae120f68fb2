//! Read-only spending summaries over calendar windows.
//!
//! Nothing in this module writes to the database. An empty window is never an
//! error: totals default to zero and lists to empty.

use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use time_tz::Tz;

use crate::{
    Error,
    category::{CategoryId, CategoryName, PeriodType, get_categories_created_in},
    ledger_date::{has_iso_datetime_prefix, parse_transaction_date},
    period::{Granularity, Period},
    transaction::{TransactionFilter, query_transactions, truncate_to_limit},
    user::UserID,
};

/// Amount and raw date of each of the user's live transactions.
fn get_dated_amounts(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<(f64, String)>, Error> {
    connection
        .prepare(
            "SELECT amount, date FROM \"transaction\" WHERE user_id = ?1 AND deleted_at IS NULL",
        )?
        .query_map([user_id.as_i64()], |row| Ok((row.get(0)?, row.get(1)?)))?
        .map(|maybe_row| maybe_row.map_err(Error::from))
        .collect()
}

/// Sum the amounts of the user's live transactions dated within `period`.
///
/// # Returns
/// The total, or zero if no transactions match. Transactions with dates that
/// cannot be parsed are skipped.
pub fn sum_for_window(
    user_id: UserID,
    period: Period,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<f64, Error> {
    let total = get_dated_amounts(user_id, connection)?
        .into_iter()
        .filter(|(_, date)| {
            parse_transaction_date(date, local_timezone).is_some_and(|date| period.contains(date))
        })
        .map(|(amount, _)| amount)
        .sum();

    Ok(total)
}

/// Spending in the current period and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub current: f64,
    pub prev: f64,
}

/// Compare spending in the period of `granularity` containing `now` with the previous one.
pub fn compare_periods(
    user_id: UserID,
    granularity: Granularity,
    now: PrimitiveDateTime,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<PeriodComparison, Error> {
    let periods = Period::pair(granularity, now);

    Ok(PeriodComparison {
        current: sum_for_window(user_id, periods.current, local_timezone, connection)?,
        prev: sum_for_window(user_id, periods.previous, local_timezone, connection)?,
    })
}

/// Orderings for a category breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategorySortBy {
    /// Largest budget first.
    #[default]
    Budget,
    /// Alphabetical by name.
    Category,
    /// Most recently recorded transaction first.
    RecentTransactions,
    /// Largest total spent first.
    AmountSpent,
}

/// A category with the total spent in it over a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: CategoryId,
    pub category: CategoryName,
    pub icon: String,
    pub budget: f64,
    pub total_amount_spent: f64,
    pub period_type: PeriodType,
    /// When the most recent transaction in the window was recorded.
    #[serde(skip)]
    pub last_transaction_at: Option<PrimitiveDateTime>,
}

/// Order `summaries` in place. Equal keys keep their existing order.
pub fn sort_category_summaries(summaries: &mut [CategorySummary], sort_by: CategorySortBy) {
    match sort_by {
        CategorySortBy::Budget => summaries.sort_by(|a, b| b.budget.total_cmp(&a.budget)),
        CategorySortBy::Category => {
            summaries.sort_by(|a, b| a.category.as_ref().cmp(b.category.as_ref()))
        }
        // `None` orders before `Some`, so reversing puts categories without transactions last.
        CategorySortBy::RecentTransactions => {
            summaries.sort_by(|a, b| b.last_transaction_at.cmp(&a.last_transaction_at))
        }
        CategorySortBy::AmountSpent => {
            summaries.sort_by(|a, b| b.total_amount_spent.total_cmp(&a.total_amount_spent))
        }
    }
}

/// Summarise spending per category for the categories created in `period`.
///
/// Every live category created in the window is included, with a total of
/// zero if none of its transactions fall in the window.
///
/// # Returns
/// At most `limit` summaries ordered by `sort_by`.
pub fn category_breakdown(
    user_id: UserID,
    period: Period,
    sort_by: CategorySortBy,
    limit: Option<usize>,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    let categories = get_categories_created_in(user_id, period, connection)?;
    let transactions = query_transactions(
        user_id,
        &TransactionFilter::for_period(period),
        local_timezone,
        connection,
    )?;

    let mut totals: HashMap<CategoryId, (f64, Option<PrimitiveDateTime>)> = HashMap::new();
    for transaction in &transactions {
        let entry = totals.entry(transaction.category.id).or_insert((0.0, None));
        entry.0 += transaction.amount;
        entry.1 = entry.1.max(Some(transaction.created_at));
    }

    let mut summaries: Vec<CategorySummary> = categories
        .into_iter()
        .map(|category| {
            let (total_amount_spent, last_transaction_at) =
                totals.get(&category.id).copied().unwrap_or((0.0, None));

            CategorySummary {
                id: category.id,
                category: category.name,
                icon: category.icon,
                budget: category.budget,
                total_amount_spent,
                period_type: category.period_type,
                last_transaction_at,
            }
        })
        .collect();

    sort_category_summaries(&mut summaries, sort_by);
    truncate_to_limit(&mut summaries, limit);

    Ok(summaries)
}

/// A large transaction for the spending chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopTransaction {
    pub category: String,
    pub amount: f64,
    pub icon: String,
    pub spent_on: String,
}

/// The user's largest transactions in `period`.
///
/// The list is cut to `limit` before non-positive amounts are dropped, so
/// fewer than `limit` items may be returned even when more positive
/// transactions exist.
pub fn top_transactions(
    user_id: UserID,
    period: Period,
    limit: Option<usize>,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<TopTransaction>, Error> {
    let mut transactions = query_transactions(
        user_id,
        &TransactionFilter::for_period(period),
        local_timezone,
        connection,
    )?;

    transactions.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    truncate_to_limit(&mut transactions, limit);

    Ok(transactions
        .into_iter()
        .filter(|transaction| transaction.amount > 0.0)
        .map(|transaction| TopTransaction {
            category: transaction.category.category,
            amount: transaction.amount,
            icon: transaction.category.icon,
            spent_on: transaction.spent_on,
        })
        .collect())
}

/// Totals and averages for one month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub total_amount: f64,
    /// Mean of the per-ISO-week totals.
    pub weekly_avg: f64,
    /// Mean of the per-day totals, over days with transactions.
    pub daily_avg: f64,
    pub days_with_transactions: usize,
}

/// Summarise spending in `period`.
///
/// Only transactions whose date string starts with a full
/// `YYYY-MM-DDTHH:MM:SS` timestamp are counted.
pub fn period_summary(
    user_id: UserID,
    period: Period,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<PeriodSummary, Error> {
    let dated_amounts: Vec<(f64, PrimitiveDateTime)> = get_dated_amounts(user_id, connection)?
        .into_iter()
        .filter(|(_, date)| has_iso_datetime_prefix(date))
        .filter_map(|(amount, date)| {
            parse_transaction_date(&date, local_timezone).map(|date| (amount, date))
        })
        .filter(|(_, date)| period.contains(*date))
        .collect();

    if dated_amounts.is_empty() {
        return Ok(PeriodSummary::default());
    }

    let mut weekly_totals: HashMap<(i32, u8), f64> = HashMap::new();
    let mut daily_totals: HashMap<u8, f64> = HashMap::new();
    let mut days: HashSet<u16> = HashSet::new();
    let mut total_amount = 0.0;

    for (amount, date) in &dated_amounts {
        let (iso_year, iso_week, _) = date.to_iso_week_date();
        *weekly_totals.entry((iso_year, iso_week)).or_insert(0.0) += amount;
        *daily_totals.entry(date.day()).or_insert(0.0) += amount;
        days.insert(date.ordinal());
        total_amount += amount;
    }

    Ok(PeriodSummary {
        total_amount,
        weekly_avg: mean(weekly_totals.values()),
        daily_avg: mean(daily_totals.values()),
        days_with_transactions: days.len(),
    })
}

fn mean<'a>(values: impl ExactSizeIterator<Item = &'a f64>) -> f64 {
    let count = values.len();

    if count == 0 {
        return 0.0;
    }

    values.sum::<f64>() / count as f64
}
