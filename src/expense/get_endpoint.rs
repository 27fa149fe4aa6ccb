//! The route handler for fetching a single expense.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::ExpenseId,
    expense::{Expense, OwnerScope, core::get_expense},
};

/// A route handler for fetching one expense by its ID.
///
/// An expense owned by somebody else responds 404, exactly like an ID that
/// does not exist.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn get_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    let expense = get_expense(expense_id, &scope, &connection)?;

    Ok(Json(expense))
}
