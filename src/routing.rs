//! Defines the routes of the application and maps them to their handlers.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState, auth, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        list_expenses_endpoint, monthly_summary_endpoint, update_expense_endpoint,
    },
    user::register_endpoint,
};

/// Create the router for the application.
///
/// The register and login routes are open; every expense route requires a
/// bearer token via the [auth::Claims] extractor on its handler.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOGIN, post(auth::sign_in))
        .route(
            endpoints::EXPENSES,
            post(create_expense_endpoint).get(list_expenses_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route(endpoints::MONTHLY_SUMMARY, get(monthly_summary_endpoint))
        .with_state(state)
}
