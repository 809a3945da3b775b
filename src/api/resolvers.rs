//! Resolves each [Operation] against the database on behalf of the caller.

use std::{collections::HashMap, str::FromStr};

use axum::response::{IntoResponse, Response};
use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    Error,
    api::{
        operation::{
            CreateCategoryArgs, CreateTransactionArgs, LoginArgs, Operation, SignupArgs,
            UpdateCategoryArgs, UpdateTransactionArgs,
        },
        response::{
            ApiResponse, AuthPayload, CategoryResponse, SummaryResponse, TransactionResponse,
            UserResponse,
        },
    },
    auth::{AuthService, RequestIdentity},
    category::{
        Category, CategoryName, CategoryUpdate, DEFAULT_COLOR, DEFAULT_ICON, NewCategory,
        create_category, delete_category, update_category,
    },
    database_id::{CategoryId, DatabaseId},
    ownership::{get_owned, list_owned},
    summary::get_summary,
    transaction::{
        NewTransaction, Transaction, TransactionUpdate, create_transaction, delete_transaction,
        get_transactions_by_category, parse_transaction_date, update_transaction,
    },
    user::{UserID, create_user, get_user_by_email, get_user_by_id},
};

/// Run `operation` for the caller described by `identity`.
///
/// Every operation other than signing up and logging in requires an identity.
pub fn resolve(
    operation: Operation,
    identity: &RequestIdentity,
    auth: &AuthService,
    connection: &Connection,
) -> Result<Response, Error> {
    let user_id = || identity.require().map(|identity| identity.user_id);

    let response = match operation {
        Operation::Signup(args) => ApiResponse::new(signup(args, auth, connection)?).into_response(),
        Operation::Login(args) => ApiResponse::new(login(args, auth, connection)?).into_response(),
        Operation::Me => ApiResponse::new(me(user_id()?, connection)?).into_response(),
        Operation::Categories => {
            ApiResponse::new(categories(user_id()?, connection)?).into_response()
        }
        Operation::Category(args) => {
            ApiResponse::new(category(args.id, user_id()?, connection)?).into_response()
        }
        Operation::Transactions => {
            ApiResponse::new(transactions(user_id()?, connection)?).into_response()
        }
        Operation::Transaction(args) => {
            ApiResponse::new(transaction(args.id, user_id()?, connection)?).into_response()
        }
        Operation::Summary => {
            let summary = get_summary(user_id()?, connection)?;
            ApiResponse::new(SummaryResponse::from(summary)).into_response()
        }
        Operation::CreateCategory(args) => {
            ApiResponse::new(create_category_for(args, user_id()?, connection)?).into_response()
        }
        Operation::UpdateCategory(args) => {
            ApiResponse::new(update_category_for(args, user_id()?, connection)?).into_response()
        }
        Operation::DeleteCategory(args) => {
            ApiResponse::new(delete_category(args.id, user_id()?, connection)?).into_response()
        }
        Operation::CreateTransaction(args) => {
            ApiResponse::new(create_transaction_for(args, user_id()?, connection)?)
                .into_response()
        }
        Operation::UpdateTransaction(args) => {
            ApiResponse::new(update_transaction_for(args, user_id()?, connection)?)
                .into_response()
        }
        Operation::DeleteTransaction(args) => {
            ApiResponse::new(delete_transaction(args.id, user_id()?, connection)?).into_response()
        }
    };

    Ok(response)
}

fn signup(
    args: SignupArgs,
    auth: &AuthService,
    connection: &Connection,
) -> Result<AuthPayload, Error> {
    let email = EmailAddress::from_str(args.email.trim())
        .map_err(|error| Error::Validation(format!("Invalid email address: {error}")))?;

    let name = args.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Name cannot be empty".to_owned()));
    }

    if args.password.is_empty() {
        return Err(Error::Validation("Password cannot be empty".to_owned()));
    }

    match get_user_by_email(&email, connection) {
        Ok(_) => return Err(Error::DuplicateEmail),
        Err(Error::NotFound) => {}
        Err(error) => return Err(error),
    }

    let password_hash = auth.hash_password(&args.password)?;
    let user = create_user(email, name, password_hash, connection)?;
    let token = auth.issue_token(user.id, user.email.as_str())?;

    tracing::info!("Registered user {}", user.id);

    Ok(AuthPayload {
        token,
        user: UserResponse::from(&user),
    })
}

fn login(args: LoginArgs, auth: &AuthService, connection: &Connection) -> Result<AuthPayload, Error> {
    let email =
        EmailAddress::from_str(args.email.trim()).map_err(|_| Error::InvalidCredentials)?;

    let user = match get_user_by_email(&email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::debug!("Log in attempt for unregistered email");
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    if !auth.verify_password(&args.password, &user.password_hash) {
        tracing::debug!("Log in attempt with wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = auth.issue_token(user.id, user.email.as_str())?;

    Ok(AuthPayload {
        token,
        user: UserResponse::from(&user),
    })
}

fn me(user_id: UserID, connection: &Connection) -> Result<UserResponse, Error> {
    let user = get_user_by_id(user_id, connection).map_err(|error| match error {
        Error::NotFound => {
            tracing::warn!("Valid token for user {user_id} that no longer exists");
            Error::Unauthenticated
        }
        error => error,
    })?;

    let categories: Vec<Category> = list_owned(user_id, connection)?;
    let transactions: Vec<Transaction> = list_owned(user_id, connection)?;

    Ok(UserResponse {
        categories: Some(categories.iter().map(CategoryResponse::from).collect()),
        transactions: Some(transactions.iter().map(TransactionResponse::from).collect()),
        ..UserResponse::from(&user)
    })
}

fn categories(user_id: UserID, connection: &Connection) -> Result<Vec<CategoryResponse>, Error> {
    let categories: Vec<Category> = list_owned(user_id, connection)?;
    let transactions: Vec<Transaction> = list_owned(user_id, connection)?;

    let mut transactions_by_category: HashMap<CategoryId, Vec<Transaction>> = HashMap::new();
    for transaction in transactions {
        transactions_by_category
            .entry(transaction.category_id)
            .or_default()
            .push(transaction);
    }

    Ok(categories
        .iter()
        .map(|category| {
            let transactions = transactions_by_category
                .get(&category.id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            CategoryResponse::from(category).with_transactions(transactions)
        })
        .collect())
}

fn category(
    category_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<CategoryResponse, Error> {
    let category: Category = get_owned(category_id, user_id, connection)?;
    let transactions = get_transactions_by_category(category.id, user_id, connection)?;

    Ok(CategoryResponse::from(&category).with_transactions(&transactions))
}

fn transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<TransactionResponse>, Error> {
    let categories: Vec<Category> = list_owned(user_id, connection)?;
    let categories: HashMap<CategoryId, Category> = categories
        .into_iter()
        .map(|category| (category.id, category))
        .collect();
    let transactions: Vec<Transaction> = list_owned(user_id, connection)?;

    Ok(transactions
        .iter()
        .map(|transaction| {
            let response = TransactionResponse::from(transaction);

            match categories.get(&transaction.category_id) {
                Some(category) => response.with_category(category),
                None => response,
            }
        })
        .collect())
}

fn transaction(
    transaction_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionResponse, Error> {
    let transaction: Transaction = get_owned(transaction_id, user_id, connection)?;

    with_category(&transaction, user_id, connection)
}

fn with_category(
    transaction: &Transaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionResponse, Error> {
    let category: Category = get_owned(transaction.category_id, user_id, connection)?;

    Ok(TransactionResponse::from(transaction).with_category(&category))
}

fn create_category_for(
    args: CreateCategoryArgs,
    user_id: UserID,
    connection: &Connection,
) -> Result<CategoryResponse, Error> {
    let new_category = NewCategory {
        name: CategoryName::new(&args.name)?,
        color: args.color.unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
        icon: args.icon.unwrap_or_else(|| DEFAULT_ICON.to_owned()),
    };

    let category = create_category(user_id, new_category, connection)?;

    Ok(CategoryResponse::from(&category).with_transactions(&[]))
}

fn update_category_for(
    args: UpdateCategoryArgs,
    user_id: UserID,
    connection: &Connection,
) -> Result<CategoryResponse, Error> {
    let update = CategoryUpdate {
        name: args.name.as_deref().map(CategoryName::new).transpose()?,
        color: args.color,
        icon: args.icon,
    };

    let category = update_category(args.id, user_id, update, connection)?;
    let transactions = get_transactions_by_category(category.id, user_id, connection)?;

    Ok(CategoryResponse::from(&category).with_transactions(&transactions))
}

fn create_transaction_for(
    args: CreateTransactionArgs,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionResponse, Error> {
    let new_transaction = NewTransaction {
        category_id: args.category_id,
        description: args.description,
        amount: args.amount,
        transaction_type: args.transaction_type,
        date: parse_transaction_date(&args.date)?,
    };

    let transaction = create_transaction(user_id, new_transaction, connection)?;

    with_category(&transaction, user_id, connection)
}

fn update_transaction_for(
    args: UpdateTransactionArgs,
    user_id: UserID,
    connection: &Connection,
) -> Result<TransactionResponse, Error> {
    let update = TransactionUpdate {
        category_id: args.category_id,
        description: args.description,
        amount: args.amount,
        transaction_type: args.transaction_type,
        date: args.date.as_deref().map(parse_transaction_date).transpose()?,
    };

    let transaction = update_transaction(args.id, user_id, update, connection)?;

    with_category(&transaction, user_id, connection)
}
