//! The route handler for recording a new expense.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{
        OwnerScope,
        core::{ExpenseForm, create_expense},
    },
};

/// A route handler for creating an expense, responds with the created record.
///
/// The owner is always the authenticated user; the payload carries no owner
/// field.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn create_expense_endpoint(
    State(state): State<AppState>,
    claims: Claims,
    Json(form): Json<ExpenseForm>,
) -> Result<impl IntoResponse, Error> {
    let new_expense = form.validate()?;
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    let expense = create_expense(new_expense, &scope, &connection)?;

    Ok((StatusCode::CREATED, Json(expense)))
}
