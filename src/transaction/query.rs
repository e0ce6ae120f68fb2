//! Month-scoped transaction queries joined with their category and source.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use time_tz::Tz;

use crate::{
    Error,
    category::CategoryId,
    ledger_date::{parse_transaction_date, reference_date},
    period::{Granularity, Period},
    source::SourceId,
    transaction::TransactionId,
    user::UserID,
};

/// The category a listed transaction belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub category: String,
    pub icon: String,
}

/// The source a listed transaction was paid from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub id: SourceId,
    pub source: String,
}

/// A transaction joined with its category and source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListing {
    pub id: TransactionId,
    pub amount: f64,
    pub spent_on: String,
    pub date: String,
    pub source: Option<SourceRef>,
    pub category: CategoryRef,
    /// `date` interpreted as a wall-clock time.
    #[serde(skip)]
    pub parsed_date: PrimitiveDateTime,
    #[serde(skip)]
    pub created_at: PrimitiveDateTime,
}

/// Which transactions to list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions dated within this period.
    pub period: Period,
    pub category_id: Option<CategoryId>,
    /// Inclusive lower bound on the amount.
    pub min_amount: Option<f64>,
    /// Inclusive upper bound on the amount.
    pub max_amount: Option<f64>,
}

impl TransactionFilter {
    /// Every transaction dated within `period`.
    pub fn for_period(period: Period) -> Self {
        Self {
            period,
            category_id: None,
            min_amount: None,
            max_amount: None,
        }
    }

    fn matches(&self, listing: &TransactionListing) -> bool {
        self.period.contains(listing.parsed_date)
            && self.min_amount.is_none_or(|min| listing.amount >= min)
            && self.max_amount.is_none_or(|max| listing.amount <= max)
    }
}

/// Get the user's live transactions matching `filter`, newest date first.
///
/// Dates are read as wall-clock times in `local_timezone`. Transactions whose
/// date cannot be parsed never match.
pub fn query_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<TransactionListing>, Error> {
    let mut statement = connection.prepare(
        "SELECT t.id, t.amount, t.spent_on, t.date, t.created_at,
                c.id, c.name, c.icon,
                s.id, s.name
        FROM \"transaction\" t
        INNER JOIN category c ON c.id = t.category_id
        LEFT JOIN source s ON s.id = t.source_id
        WHERE t.user_id = ?1 AND t.deleted_at IS NULL
            AND (?2 IS NULL OR t.category_id = ?2)
        ORDER BY t.id ASC",
    )?;

    let mut listings = Vec::new();
    let rows = statement.query_map((user_id.as_i64(), filter.category_id), |row| {
        map_row(row, local_timezone)
    })?;

    for row in rows {
        if let Some(listing) = row?
            && filter.matches(&listing)
        {
            listings.push(listing);
        }
    }

    listings.sort_by(|a, b| b.parsed_date.cmp(&a.parsed_date));

    Ok(listings)
}

/// Maps a row to a listing, or `None` if its date cannot be parsed.
fn map_row(
    row: &Row,
    local_timezone: &Tz,
) -> Result<Option<TransactionListing>, rusqlite::Error> {
    let date: String = row.get(3)?;
    let Some(parsed_date) = parse_transaction_date(&date, local_timezone) else {
        return Ok(None);
    };

    let source = match row.get::<_, Option<SourceId>>(8)? {
        Some(id) => Some(SourceRef {
            id,
            source: row.get(9)?,
        }),
        None => None,
    };

    Ok(Some(TransactionListing {
        id: row.get(0)?,
        amount: row.get(1)?,
        spent_on: row.get(2)?,
        date,
        source,
        category: CategoryRef {
            id: row.get(5)?,
            category: row.get(6)?,
            icon: row.get(7)?,
        },
        parsed_date,
        created_at: row.get(4)?,
    }))
}

/// Keep at most `limit` items. A limit of zero or `None` keeps everything.
pub fn truncate_to_limit<T>(items: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit.filter(|limit| *limit > 0) {
        items.truncate(limit);
    }
}

/// Alternative orderings for a transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionSortBy {
    /// Largest amount first.
    Amount,
}

/// The request body for listing transactions.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionQuery {
    /// Any date within the month to list. Defaults to the current month.
    pub month: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub sort_by: Option<TransactionSortBy>,
    pub limit: Option<usize>,
}

/// List the user's transactions for the month in `query`.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `query.month` is not a date.
pub fn list_transactions(
    user_id: UserID,
    query: &TransactionQuery,
    now: PrimitiveDateTime,
    local_timezone: &Tz,
    connection: &Connection,
) -> Result<Vec<TransactionListing>, Error> {
    let reference = reference_date(query.month.as_deref(), now, local_timezone)?;
    let filter = TransactionFilter {
        period: Period::containing(Granularity::Month, reference),
        category_id: query.category_id,
        min_amount: query.min_amount,
        max_amount: query.max_amount,
    };

    let mut listings = query_transactions(user_id, &filter, local_timezone, connection)?;

    if let Some(TransactionSortBy::Amount) = query.sort_by {
        listings.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    }

    truncate_to_limit(&mut listings, query.limit);

    Ok(listings)
}
