//! The route handler for listing expenses.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{ExpenseFilter, ExpensePage, OwnerScope, SortKey, query::list_expenses},
    pagination::Page,
};

/// The raw query parameters of the listing endpoint.
///
/// Everything arrives as an optional string; parsing and validation happen
/// in [ExpenseFilter::compile], [SortKey::parse], and [Page::from_params].
/// Parameters not listed here are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseListParams {
    /// Inclusive lower bound on the expense date, ISO format.
    pub start_date: Option<String>,
    /// Inclusive upper bound on the expense date, ISO format.
    pub end_date: Option<String>,
    /// Exact category name to match.
    pub category: Option<String>,
    /// Inclusive lower bound on the amount.
    pub min_amount: Option<String>,
    /// Inclusive upper bound on the amount.
    pub max_amount: Option<String>,
    /// The field to sort by, with a leading `-` for descending.
    pub ordering: Option<String>,
    /// The 1-indexed page number.
    pub page: Option<String>,
    /// The number of records per page.
    pub page_size: Option<String>,
}

/// A route handler for listing the authenticated user's expenses with
/// optional filters, sorting, and pagination.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn list_expenses_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<ExpensePage>, Error> {
    let filter = ExpenseFilter::compile(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.category.as_deref(),
        params.min_amount.as_deref(),
        params.max_amount.as_deref(),
    )?;
    let sort = SortKey::parse(params.ordering.as_deref())?;
    let page = Page::from_params(
        params.page.as_deref(),
        params.page_size.as_deref(),
        &state.pagination_config,
    )?;
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    let expense_page = list_expenses(&scope, &filter, sort, &page, &connection)?;

    Ok(Json(expense_page))
}
