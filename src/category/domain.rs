//! Core category types: names, period types and the stored category record.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::{Error, database_id::DatabaseId, ledger_date::wall_clock, user::UserID};

/// The identifier of a category record.
pub type CategoryId = DatabaseId;

/// The name of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if `name` is empty after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a category's budget repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodType {
    /// A single budget for the month the category was created in.
    Once,
    /// Every month.
    Monthly,
    /// Every three months.
    Quarterly,
    /// Every six months.
    HalfYearly,
    /// Every twelve months.
    Annually,
}

impl PeriodType {
    /// The number of months between generated records, `None` for one-off categories.
    pub fn cadence_months(self) -> Option<u32> {
        match self {
            PeriodType::Once => None,
            PeriodType::Monthly => Some(1),
            PeriodType::Quarterly => Some(3),
            PeriodType::HalfYearly => Some(6),
            PeriodType::Annually => Some(12),
        }
    }

    /// The value stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodType::Once => "once",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::HalfYearly => "half-yearly",
            PeriodType::Annually => "annually",
        }
    }
}

impl FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(PeriodType::Once),
            "monthly" => Ok(PeriodType::Monthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            "half-yearly" => Ok(PeriodType::HalfYearly),
            "annually" => Ok(PeriodType::Annually),
            other => Err(format!("unknown period type \"{other}\"")),
        }
    }
}

/// How far ahead recurring categories are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreationDuration {
    /// Up to the end of the eleventh month after the current one.
    #[default]
    Next12Months,
    /// Up to 31 December of the current year.
    YearEnd,
}

/// A budget category owned by a user.
///
/// Recurring budgets are stored as one record per period, with `created_at`
/// set to the start of that period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(skip)]
    pub user_id: UserID,
    #[serde(rename = "category")]
    pub name: CategoryName,
    pub icon: String,
    pub budget: f64,
    pub period_type: PeriodType,
    #[serde(with = "wall_clock")]
    pub created_at: PrimitiveDateTime,
}

/// The fields needed to insert a category record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub user_id: UserID,
    pub name: CategoryName,
    pub icon: String,
    pub budget: f64,
    pub period_type: PeriodType,
    pub created_at: PrimitiveDateTime,
}

/// The fields a client may replace on an existing category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub name: CategoryName,
    pub icon: String,
    pub budget: f64,
    pub period_type: PeriodType,
}
