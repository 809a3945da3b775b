//! Transactions, the income and expenses that a user records against their
//! categories.

mod db;
mod domain;

pub use db::{
    create_transaction, create_transaction_table, delete_transaction,
    get_transactions_by_category, update_transaction,
};
pub use domain::{
    NewTransaction, Transaction, TransactionType, TransactionUpdate, parse_transaction_date,
};
