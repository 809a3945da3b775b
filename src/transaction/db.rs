//! Database operations for transactions.
//!
//! Every operation takes the ID of the acting user and only touches
//! transactions, and categories referenced by transactions, owned by that user.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use time::UtcOffset;

use crate::{
    Error,
    category::Category,
    database_id::{CategoryId, DatabaseId, TransactionId},
    db::current_timestamp,
    ownership::{OwnedResource, get_owned},
    transaction::{NewTransaction, Transaction, TransactionUpdate},
    user::UserID,
};

const SELECT_COLUMNS: &str = "SELECT id, user_id, category_id, description, amount, type, date, created_at FROM \"transaction\"";

impl OwnedResource for Transaction {
    const KIND: &'static str = "transaction";

    fn owner(&self) -> UserID {
        self.user_id
    }

    fn select_by_id(id: DatabaseId, connection: &Connection) -> Result<Self, Error> {
        connection
            .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id;"))?
            .query_row(&[(":id", &id)], map_transaction_row)
            .map_err(|error| error.into())
    }

    fn select_by_owner(owner: UserID, connection: &Connection) -> Result<Vec<Self>, Error> {
        connection
            .prepare(&format!(
                "{SELECT_COLUMNS} WHERE user_id = :user_id ORDER BY date DESC, id DESC;"
            ))?
            .query_map(&[(":user_id", &owner.as_i64())], map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }
}

/// Check that `category_id` refers to a category owned by `owner`.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist or is
/// owned by another user.
fn require_owned_category(
    category_id: CategoryId,
    owner: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    get_owned::<Category>(category_id, owner, connection).map_err(|error| match error {
        Error::NotFound => Error::CategoryNotFound,
        error => error,
    })
}

/// Create a transaction owned by `owner`.
///
/// The date is stored in UTC so that transactions sort by time.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the category does not exist or is owned by
///   another user, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    owner: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    require_owned_category(new_transaction.category_id, owner, connection)?;

    let date = new_transaction.date.to_offset(UtcOffset::UTC);
    let created_at = current_timestamp();

    connection.execute(
        "INSERT INTO \"transaction\" (user_id, category_id, description, amount, type, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            owner.as_i64(),
            new_transaction.category_id,
            &new_transaction.description,
            new_transaction.amount.to_string(),
            new_transaction.transaction_type,
            date,
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: owner,
        category_id: new_transaction.category_id,
        description: new_transaction.description,
        amount: new_transaction.amount,
        transaction_type: new_transaction.transaction_type,
        date,
        created_at,
    })
}

/// Apply `update` to the transaction `transaction_id` owned by `owner`.
///
/// If the update moves the transaction to another category, that category
/// must also be owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction does not exist or is owned by another user,
/// - [Error::CategoryNotFound] if the new category does not exist or is owned by another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    transaction_id: TransactionId,
    owner: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction: Transaction = get_owned(transaction_id, owner, connection)?;

    if let Some(category_id) = update.category_id {
        require_owned_category(category_id, owner, connection)?;
    }

    let mut transaction = update.apply(transaction);
    transaction.date = transaction.date.to_offset(UtcOffset::UTC);

    connection.execute(
        "UPDATE \"transaction\"
         SET category_id = ?1, description = ?2, amount = ?3, type = ?4, date = ?5
         WHERE id = ?6 AND user_id = ?7",
        (
            transaction.category_id,
            &transaction.description,
            transaction.amount.to_string(),
            transaction.transaction_type,
            transaction.date,
            transaction.id,
            owner.as_i64(),
        ),
    )?;

    Ok(transaction)
}

/// Delete the transaction `transaction_id` owned by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or is owned by
/// another user.
pub fn delete_transaction(
    transaction_id: TransactionId,
    owner: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    let transaction: Transaction = get_owned(transaction_id, owner, connection)?;

    connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction.id, owner.as_i64()),
    )?;

    Ok(true)
}

/// Retrieve the transactions in the category `category_id` owned by `owner`.
pub fn get_transactions_by_category(
    category_id: CategoryId,
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE category_id = :category_id AND user_id = :user_id \
            ORDER BY date DESC, id DESC;"
        ))?
        .query_map(
            &[
                (":category_id", &category_id),
                (":user_id", &owner.as_i64()),
            ],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                description TEXT,
                amount TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id),
                FOREIGN KEY(category_id) REFERENCES category(id)
                );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_id ON \"transaction\"(user_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id);",
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_user_id = row.get(1)?;
    let raw_amount: String = row.get(4)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(raw_user_id),
        category_id: row.get(2)?,
        description: row.get(3)?,
        amount,
        transaction_type: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}
