//! Expensr is a JSON REST API for tracking personal expenses.
//!
//! Users register an account, log in for a bearer token, and then record
//! expenses (an amount, a category, and the date the money was spent).
//! Expenses can be listed with filters, sorting, and pagination, and
//! summarized per month and category.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod pagination;
mod routing;
mod user;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use pagination::PaginationConfig;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A field in a request body failed validation.
    ///
    /// The field name is reported back to the client alongside the message,
    /// matching the `{"<field>": ["<message>"]}` body shape clients expect.
    #[error("{field}: {message}")]
    Validation {
        /// The name of the offending request body field.
        field: &'static str,
        /// A human readable description of what was wrong with the value.
        message: String,
    },

    /// A query parameter could not be parsed as a filter value.
    ///
    /// Covers malformed dates and amounts as well as the pagination
    /// parameters. An unknown category name is deliberately *not* this error,
    /// it simply matches no records.
    #[error("invalid value for the {0} query parameter")]
    InvalidFilter(&'static str),

    /// The `ordering` query parameter named a field that cannot be sorted on.
    #[error("ordering must be one of \"date\", \"-date\", \"amount\" or \"-amount\"")]
    InvalidSort,

    /// The email address used to register already belongs to a user.
    #[error("a user with this email address already exists")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// Records owned by another user are reported with this error too, so a
    /// client cannot tell a foreign record apart from a missing one.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ field: [message] })),
            )
                .into_response(),
            Error::InvalidFilter(field) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "detail": format!("Invalid value for the {field} query parameter.")
                })),
            )
                .into_response(),
            Error::InvalidSort => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "detail": "Ordering must be one of \"date\", \"-date\", \"amount\" or \"-amount\"."
                })),
            )
                .into_response(),
            Error::DuplicateEmail => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "email": ["A user with this email already exists."] })),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not found." })),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "An unexpected error occurred." })),
                )
                    .into_response()
            }
        }
    }
}
