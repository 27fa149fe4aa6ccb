//! Executes filtered, sorted, paginated listings over the expense table.

use rusqlite::{Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    expense::{Expense, ExpenseFilter, OwnerScope, core::map_expense_row},
    pagination::Page,
};

/// The order a listing returns records in.
///
/// Parsed from the `ordering` query parameter, where a leading `-` means
/// descending. Whatever the requested field, ties always break by `id DESC`
/// so that records created later come first and page boundaries are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Oldest date first.
    DateAscending,
    /// Newest date first. The default.
    DateDescending,
    /// Smallest amount first.
    AmountAscending,
    /// Largest amount first.
    AmountDescending,
}

impl SortKey {
    /// Parse the `ordering` query parameter.
    ///
    /// # Errors
    /// Returns [Error::InvalidSort] for anything other than `date`, `-date`,
    /// `amount`, or `-amount`.
    pub fn parse(ordering: Option<&str>) -> Result<Self, Error> {
        match ordering {
            None => Ok(SortKey::DateDescending),
            Some("date") => Ok(SortKey::DateAscending),
            Some("-date") => Ok(SortKey::DateDescending),
            Some("amount") => Ok(SortKey::AmountAscending),
            Some("-amount") => Ok(SortKey::AmountDescending),
            Some(_) => Err(Error::InvalidSort),
        }
    }

    fn order_by(&self) -> &'static str {
        match self {
            SortKey::DateAscending => "ORDER BY date ASC, id DESC",
            SortKey::DateDescending => "ORDER BY date DESC, id DESC",
            SortKey::AmountAscending => "ORDER BY CAST(amount AS REAL) ASC, id DESC",
            SortKey::AmountDescending => "ORDER BY CAST(amount AS REAL) DESC, id DESC",
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePage {
    /// How many records match the filter in total, ignoring pagination.
    pub count: u64,
    /// The records on the requested page, in the requested order.
    pub results: Vec<Expense>,
}

/// List the expenses owned by the user in `scope` that match `filter`.
///
/// The `WHERE` clause always starts with the owner condition; the filter
/// fragments are appended after it and cannot widen the scope. The returned
/// count is computed over the same predicate before `LIMIT`/`OFFSET` are
/// applied, so it does not change from page to page. A page past the end of
/// the results is empty but still reports the true count.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn list_expenses(
    scope: &OwnerScope,
    filter: &ExpenseFilter,
    sort: SortKey,
    page: &Page,
    connection: &Connection,
) -> Result<ExpensePage, Error> {
    if filter.matches_nothing() {
        return Ok(ExpensePage {
            count: 0,
            results: Vec::new(),
        });
    }

    let owner = scope.owner();
    let mut params: Vec<&dyn ToSql> = vec![&owner];
    for param in filter.params() {
        params.push(param.as_ref());
    }

    let where_sql = format!("WHERE user_id = ?{}", filter.where_sql());

    // SQLite integers are signed; COUNT(*) is never negative.
    let count: i64 = connection
        .prepare(&format!("SELECT COUNT(*) FROM expense {where_sql}"))?
        .query_one(params.as_slice(), |row| row.get(0))?;
    let count = count as u64;

    let results = connection
        .prepare(&format!(
            "SELECT id, user_id, amount, category, description, date, created_at
             FROM expense {where_sql} {} LIMIT {} OFFSET {}",
            sort.order_by(),
            page.limit(),
            page.offset(),
        ))?
        .query_map(params.as_slice(), map_expense_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExpensePage { count, results })
}
