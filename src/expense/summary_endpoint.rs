//! The route handler for the monthly summary report.

use axum::{Json, extract::State};

use crate::{
    AppState, Error,
    auth::Claims,
    expense::{MonthlySummary, OwnerScope, summary::summarize_by_month},
};

/// A route handler for the per-month, per-category totals of the
/// authenticated user's expenses.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn monthly_summary_endpoint(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<MonthlySummary>, Error> {
    let scope = OwnerScope::from(&claims);

    let connection = state.db_connection.lock().unwrap();
    let summary = summarize_by_month(&scope, &connection)?;

    Ok(Json(summary))
}
