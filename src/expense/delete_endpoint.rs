//! The route handler for deleting an expense.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::ExpenseId,
    expense::{OwnerScope, core::delete_expense},
};

/// A route handler for deleting an expense, responds with 204 No Content.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn delete_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    delete_expense(expense_id, &scope, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
