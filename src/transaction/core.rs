//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{CategoryId, CategoryName, get_category},
    database_id::TransactionId,
    transaction::Amount,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Incoming funds, written as "entrada".
    #[serde(rename = "entrada")]
    Income,
    /// Outgoing funds, written as "saída".
    #[serde(rename = "saída")]
    Expense,
}

impl TransactionType {
    /// The name of the transaction type as it appears in JSON and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "entrada",
            TransactionType::Expense => "saída",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entrada" => Ok(TransactionType::Income),
            "saída" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("invalid transaction type {text:?}").into()))
    }
}

/// An income or expense, i.e. an event where money was either earned or spent.
///
/// `category_name` is joined in from the category table when the transaction
/// is read, and is `None` only if the category row has since disappeared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money earned or spent in this transaction.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub type_: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The name of the category the transaction belongs to.
    pub category_name: Option<CategoryName>,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Amount,
    pub date: Date,
    pub type_: TransactionType,
    pub category_id: CategoryId,
}

/// Validated changes to apply to an existing transaction.
///
/// Fields set to `None` are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub description: Option<String>,
    pub amount: Option<Amount>,
    pub date: Option<Date>,
    pub type_: Option<TransactionType>,
    pub category_id: Option<CategoryId>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Selects the columns expected by [map_transaction_row].
pub(super) const SELECT_TRANSACTION: &str = "SELECT \"transaction\".id, description, amount, date, type, \
    category_id, category.name \
    FROM \"transaction\" \
    LEFT JOIN category ON \"transaction\".category_id = category.id";

/// Create a new transaction in the database.
///
/// The category check and the insert happen in one transaction, which is
/// rolled back on any error.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    get_category(new_transaction.category_id, &tx)?;

    let id: TransactionId = tx
        .query_row(
            "INSERT INTO \"transaction\" (description, amount, date, type, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            params![
                new_transaction.description,
                new_transaction.amount,
                new_transaction.date,
                new_transaction.type_,
                new_transaction.category_id,
            ],
            |row| row.get(0),
        )
        .map_err(|error| map_foreign_key_error(error, new_transaction.category_id))?;

    let transaction = get_transaction(id, &tx)?;
    tx.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction, with its category name, from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE \"transaction\".id = :id"))?
        .query_row(&[(":id", &id)], map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound(id),
            error => error.into(),
        })
}

/// Apply `changes` to the transaction `id` and return the updated transaction.
///
/// Only the fields set in `changes` are modified.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - [Error::CategoryNotFound] if a new category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;

    let current = get_transaction(id, &tx)?;

    if let Some(category_id) = changes.category_id {
        get_category(category_id, &tx)?;
    }

    let category_id = changes.category_id.unwrap_or(current.category_id);

    tx.execute(
        "UPDATE \"transaction\" \
        SET description = ?1, amount = ?2, date = ?3, type = ?4, category_id = ?5 \
        WHERE id = ?6",
        params![
            changes.description.unwrap_or(current.description),
            changes.amount.unwrap_or(current.amount),
            changes.date.unwrap_or(current.date),
            changes.type_.unwrap_or(current.type_),
            category_id,
            id,
        ],
    )
    .map_err(|error| map_foreign_key_error(error, category_id))?;

    let transaction = get_transaction(id, &tx)?;
    tx.commit()?;

    Ok(transaction)
}

/// Delete the transaction `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound(id));
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('entrada', 'saída')),
                category_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id)
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_date_category
            ON \"transaction\"(date, category_id);",
    )
}

/// Map a database row to a Transaction.
///
/// Expects the columns in the order of [SELECT_TRANSACTION].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let category_name = row
        .get::<usize, Option<String>>(6)?
        .map(|name| CategoryName::new_unchecked(&name));

    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        type_: row.get(4)?,
        category_id: row.get(5)?,
        category_name,
    })
}

fn map_foreign_key_error(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::CategoryNotFound(category_id),
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
