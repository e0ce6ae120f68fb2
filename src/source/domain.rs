//! Payment sources such as "Cash" or "Credit Card".

use std::fmt::Display;

use serde::Serialize;
use time::PrimitiveDateTime;

use crate::{Error, database_id::DatabaseId, user::UserID};

pub type SourceId = DatabaseId;

/// The label of a payment source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceName(String);

impl SourceName {
    /// Create a source name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptySourceName] if `name` is empty after trimming.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptySourceName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for SourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the money for a transaction came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub id: SourceId,
    #[serde(skip)]
    pub user_id: UserID,
    #[serde(rename = "source")]
    pub name: SourceName,
    #[serde(skip)]
    pub created_at: PrimitiveDateTime,
}
