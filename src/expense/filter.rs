//! Compiles the raw listing query parameters into a SQL predicate.

use rusqlite::ToSql;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use time::{Date, macros::format_description};

use crate::{Error, expense::Category};

/// A validated filter over the expense table.
///
/// Built from the raw query strings of the listing endpoint. All present
/// filters AND together; a filter that can never match anything (an unknown
/// category name, or a date range that ends before it starts) short-circuits
/// via [ExpenseFilter::matches_nothing] instead of producing SQL.
///
/// Amount comparisons go through `CAST(amount AS REAL)`: amounts carry at
/// most 10 digits, so the f64 conversion is injective and order-preserving
/// and the comparison stays exact.
pub struct ExpenseFilter {
    clauses: Vec<&'static str>,
    params: Vec<Box<dyn ToSql>>,
    matches_nothing: bool,
}

impl ExpenseFilter {
    /// Compile the raw filter parameters of a listing request.
    ///
    /// `startDate` and `endDate` are inclusive ISO dates, `minAmount` and
    /// `maxAmount` inclusive decimal bounds, and `category` an exact category
    /// name. Absent parameters are unconstrained.
    ///
    /// Dates and amounts that fail to parse are the client's mistake and get
    /// an [Error::InvalidFilter] naming the parameter. An unknown category
    /// name, by contrast, is a filter that matches no records, not an error.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilter] if a date or amount parameter is
    /// present but malformed.
    pub fn compile(
        start_date: Option<&str>,
        end_date: Option<&str>,
        category: Option<&str>,
        min_amount: Option<&str>,
        max_amount: Option<&str>,
    ) -> Result<Self, Error> {
        let mut filter = Self {
            clauses: Vec::new(),
            params: Vec::new(),
            matches_nothing: false,
        };

        let start_date = parse_date(start_date, "startDate")?;
        let end_date = parse_date(end_date, "endDate")?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                filter.matches_nothing = true;
            }
        }

        if let Some(start) = start_date {
            filter.push("date >= ?", start);
        }

        if let Some(end) = end_date {
            filter.push("date <= ?", end);
        }

        if let Some(raw) = category {
            match raw.parse::<Category>() {
                Ok(category) => filter.push("category = ?", category),
                Err(_) => filter.matches_nothing = true,
            }
        }

        if let Some(min) = parse_amount(min_amount, "minAmount")? {
            filter.push("CAST(amount AS REAL) >= ?", min);
        }

        if let Some(max) = parse_amount(max_amount, "maxAmount")? {
            filter.push("CAST(amount AS REAL) <= ?", max);
        }

        Ok(filter)
    }

    /// Whether this filter can never match a record.
    ///
    /// Callers should skip the database entirely and report an empty result.
    pub fn matches_nothing(&self) -> bool {
        self.matches_nothing
    }

    /// The SQL to append to a `WHERE user_id = ?` clause, starting with
    /// " AND" if any filters are present.
    pub(crate) fn where_sql(&self) -> String {
        self.clauses
            .iter()
            .map(|clause| format!(" AND {clause}"))
            .collect()
    }

    /// The bound parameters for [ExpenseFilter::where_sql], in clause order.
    pub(crate) fn params(&self) -> &[Box<dyn ToSql>] {
        &self.params
    }

    fn push(&mut self, clause: &'static str, param: impl ToSql + 'static) {
        self.clauses.push(clause);
        self.params.push(Box::new(param));
    }
}

fn parse_date(value: Option<&str>, field: &'static str) -> Result<Option<Date>, Error> {
    match value {
        None => Ok(None),
        Some(raw) => Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| Error::InvalidFilter(field)),
    }
}

fn parse_amount(value: Option<&str>, field: &'static str) -> Result<Option<f64>, Error> {
    match value {
        None => Ok(None),
        Some(raw) => {
            let amount: Decimal = raw.parse().map_err(|_| Error::InvalidFilter(field))?;

            amount
                .to_f64()
                .map(Some)
                .ok_or(Error::InvalidFilter(field))
        }
    }
}
