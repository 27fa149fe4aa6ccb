//! The closed set of categories an expense can be tagged with.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// What an expense was for.
///
/// The set is closed: the store only ever holds one of these names, so
/// filtering and grouping by category never has to deal with free text.
/// Categories are stored and serialized as their uppercase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Groceries, restaurants, takeaways.
    Food,
    /// Transport of any kind, from bus fares to flights.
    Travel,
    /// Rent or mortgage payments.
    Rent,
    /// Non-food retail.
    Shopping,
    /// Recurring charges such as utilities and subscriptions.
    Bills,
    /// Anything that does not fit the categories above.
    Other,
}

impl Category {
    /// The canonical uppercase name, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "FOOD",
            Category::Travel => "TRAVEL",
            Category::Rent => "RENT",
            Category::Shopping => "SHOPPING",
            Category::Bills => "BILLS",
            Category::Other => "OTHER",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error returned when a string does not name a [Category].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl Display for UnknownCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" is not a valid category", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FOOD" => Ok(Category::Food),
            "TRAVEL" => Ok(Category::Travel),
            "RENT" => Ok(Category::Rent),
            "SHOPPING" => Ok(Category::Shopping),
            "BILLS" => Ok(Category::Bills),
            "OTHER" => Ok(Category::Other),
            other => Err(UnknownCategory(other.to_owned())),
        }
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: UnknownCategory| FromSqlError::Other(Box::new(error)))
    }
}
