//! Defines the endpoint for reading a single transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{Transaction, core::get_transaction},
};

/// The state needed to get a transaction.
#[derive(Debug, Clone)]
pub struct GetTransactionState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler that responds with the transaction `transaction_id`.
pub async fn get_transaction_endpoint(
    State(state): State<GetTransactionState>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = path?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_transaction(transaction_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use rusqlite::Connection;

    use crate::{Error, db::initialize, transaction::get_transaction_endpoint};

    use super::GetTransactionState;

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let state = GetTransactionState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        let result = get_transaction_endpoint(State(state), Ok(Path(3))).await;

        assert_eq!(result.unwrap_err(), Error::TransactionNotFound(3));
    }
}
