//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `Amount` and `TransactionType` values
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction JSON API

mod amount;
mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod get_endpoint;
mod list_endpoint;
mod query;

pub use amount::Amount;
pub use self::core::{Transaction, TransactionType, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use self::core::{
    NewTransaction, TransactionChanges, count_transactions, create_transaction,
    delete_transaction, get_transaction, update_transaction,
};
#[cfg(test)]
pub use crate::database_id::TransactionId;
