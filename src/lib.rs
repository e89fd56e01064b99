//! A personal finance tracker backend.
//!
//! This library provides a JSON REST API for recording income and expense
//! transactions and grouping them into categories, backed by SQLite.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod routing;
mod transaction;

pub use app_state::AppState;
pub use category::{Category, CategoryId, CategoryName};
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{Amount, Transaction, TransactionType};

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
    /// An empty string was used to create a category name.
    #[error("Category name is required.")]
    EmptyCategoryName,

    /// A category with the same name already exists.
    #[error("The category \"{0}\" already exists.")]
    DuplicateCategoryName(String),

    /// A required field was absent (or `null`) in the request body.
    #[error("The field \"{0}\" is required.")]
    MissingField(&'static str),

    /// An empty string was used as a transaction description.
    #[error("Transaction description cannot be empty.")]
    EmptyDescription,

    /// The amount could not be parsed as a positive decimal number that fits
    /// in ten digits with two decimal places.
    #[error("\"{0}\" is not a valid amount, expected a positive decimal number.")]
    InvalidAmount(String),

    /// The transaction type was not one of "entrada" or "saída".
    #[error("\"{0}\" is not a valid transaction type, expected \"entrada\" or \"saída\".")]
    InvalidTransactionType(String),

    /// The date could not be parsed as an ISO 8601 calendar date.
    #[error("\"{0}\" is not a valid date, expected the format YYYY-MM-DD.")]
    InvalidDate(String),

    /// The request body, path or query string could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The category ID does not refer to an existing category.
    #[error("Could not find a category with the ID {0}.")]
    CategoryNotFound(CategoryId),

    /// The transaction ID does not refer to an existing transaction.
    #[error("Could not find a transaction with the ID {0}.")]
    TransactionNotFound(TransactionId),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl Error {
    /// The HTTP status code that this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyCategoryName
            | Error::MissingField(_)
            | Error::EmptyDescription
            | Error::InvalidAmount(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidDate(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategoryName(_) => StatusCode::CONFLICT,
            Error::CategoryNotFound(_) | Error::TransactionNotFound(_) | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("An unexpected error occurred: {}", self);
            json!({
                "message": "An unexpected error occurred, check the server logs for more details.",
                "error": self.to_string(),
            })
        } else {
            json!({ "message": self.to_string() })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::Error;

    async fn response_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");

        (status, serde_json::from_slice(&body).expect("body is not JSON"))
    }

    #[tokio::test]
    async fn validation_errors_are_bad_request_with_message() {
        let (status, body) = response_json(Error::EmptyCategoryName).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Category name is required.");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn duplicate_category_is_conflict() {
        let (status, _) = response_json(Error::DuplicateCategoryName("Food".to_owned())).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (status, body) = response_json(Error::TransactionNotFound(7)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Could not find a transaction with the ID 7.");
    }

    #[tokio::test]
    async fn internal_errors_include_detail() {
        let (status, body) = response_json(Error::DatabaseLockError).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "could not acquire the database lock");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
