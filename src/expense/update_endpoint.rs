//! The route handler for replacing an expense.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState, Error,
    auth::Claims,
    database_id::ExpenseId,
    expense::{
        Expense, OwnerScope,
        core::{ExpenseForm, update_expense},
    },
};

/// A route handler for replacing every user-editable field of an expense.
///
/// The payload is validated exactly like on creation. The ID, owner, and
/// creation time never change.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Path(expense_id): Path<ExpenseId>,
    Json(form): Json<ExpenseForm>,
) -> Result<Json<Expense>, Error> {
    let new_expense = form.validate()?;
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    let expense = update_expense(expense_id, new_expense, &scope, &connection)?;

    Ok(Json(expense))
}
