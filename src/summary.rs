//! Totals of a user's income and expenses.
//!
//! Provides functions to sum a user's transactions by type and to group their
//! expenses by category.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    category::Category,
    database_id::CategoryId,
    ownership::list_owned,
    transaction::{Transaction, TransactionType},
    user::UserID,
};

/// The total spent in a single category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub total: Decimal,
}

/// The totals over all of a user's transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// The sum of all income.
    pub total_income: Decimal,
    /// The sum of all expenses.
    pub total_expense: Decimal,
    /// Income minus expenses.
    pub balance: Decimal,
    /// The number of transactions that were summed.
    pub transaction_count: usize,
    /// Expenses grouped by category, largest total first.
    ///
    /// Categories without expenses are left out.
    pub expenses_by_category: Vec<CategoryTotal>,
}

/// Sum `transactions` and group their expenses by the matching entry in `categories`.
///
/// # Errors
///
/// Returns an [Error::Validation] if a total does not fit in a [Decimal].
pub fn summarize(categories: &[Category], transactions: &[Transaction]) -> Result<Summary, Error> {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut expenses_by_category_id: HashMap<CategoryId, Decimal> = HashMap::new();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => {
                total_income = checked_sum(total_income, transaction.amount)?;
            }
            TransactionType::Expense => {
                total_expense = checked_sum(total_expense, transaction.amount)?;
                let category_total = expenses_by_category_id
                    .entry(transaction.category_id)
                    .or_insert(Decimal::ZERO);
                *category_total = checked_sum(*category_total, transaction.amount)?;
            }
        }
    }

    let balance = total_income
        .checked_sub(total_expense)
        .ok_or_else(overflow_error)?;

    let mut expenses_by_category: Vec<CategoryTotal> = categories
        .iter()
        .filter_map(|category| {
            expenses_by_category_id
                .get(&category.id)
                .map(|total| CategoryTotal {
                    category_id: category.id,
                    name: category.name.to_string(),
                    color: category.color.clone(),
                    icon: category.icon.clone(),
                    total: *total,
                })
        })
        .collect();

    expenses_by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    Ok(Summary {
        total_income,
        total_expense,
        balance,
        transaction_count: transactions.len(),
        expenses_by_category,
    })
}

fn checked_sum(total: Decimal, amount: Decimal) -> Result<Decimal, Error> {
    total.checked_add(amount).ok_or_else(overflow_error)
}

fn overflow_error() -> Error {
    Error::Validation("The transaction totals are too large to summarize".to_owned())
}

/// Summarize every transaction owned by `owner`.
pub fn get_summary(owner: UserID, connection: &Connection) -> Result<Summary, Error> {
    let categories: Vec<Category> = list_owned(owner, connection)?;
    let transactions: Vec<Transaction> = list_owned(owner, connection)?;

    summarize(&categories, &transactions)
}


#[cfg(test)]
mod get_summary_tests {
    use rust_decimal::Decimal;
    use time::macros::datetime;

    use crate::{
        category::{CategoryName, NewCategory, create_category},
        test_utils::{get_test_connection, insert_test_user},
        transaction::{NewTransaction, TransactionType, create_transaction},
    };

    use super::get_summary;

    #[test]
    fn only_sums_own_transactions() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection, "a@x.com");
        let other = insert_test_user(&connection, "b@x.com");

        for (owner, amount) in [(user.id, 10), (other.id, 99)] {
            let category = create_category(
                owner,
                NewCategory {
                    name: CategoryName::new_unchecked("Food"),
                    color: "#3B82F6".to_owned(),
                    icon: "🍔".to_owned(),
                },
                &connection,
            )
            .unwrap();
            create_transaction(
                owner,
                NewTransaction {
                    category_id: category.id,
                    description: None,
                    amount: Decimal::new(amount, 0),
                    transaction_type: TransactionType::Expense,
                    date: datetime!(2024-01-15 00:00:00 UTC),
                },
                &connection,
            )
            .unwrap();
        }

        let summary = get_summary(user.id, &connection).unwrap();

        assert_eq!(summary.total_expense, Decimal::new(10, 0));
        assert_eq!(summary.transaction_count, 1);
        assert_eq!(summary.expenses_by_category.len(), 1);
    }
}
