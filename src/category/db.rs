//! Database operations for categories.
//!
//! Every operation takes the ID of the acting user and only touches categories
//! owned by that user.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName, CategoryUpdate, NewCategory},
    database_id::{CategoryId, DatabaseId},
    db::current_timestamp,
    ownership::{OwnedResource, get_owned, list_owned},
    user::UserID,
};

impl OwnedResource for Category {
    const KIND: &'static str = "category";

    fn owner(&self) -> UserID {
        self.user_id
    }

    fn select_by_id(id: DatabaseId, connection: &Connection) -> Result<Self, Error> {
        connection
            .prepare(
                "SELECT id, user_id, name, color, icon, created_at FROM category WHERE id = :id;",
            )?
            .query_row(&[(":id", &id)], map_row)
            .map_err(|error| error.into())
    }

    fn select_by_owner(owner: UserID, connection: &Connection) -> Result<Vec<Self>, Error> {
        connection
            .prepare(
                "SELECT id, user_id, name, color, icon, created_at FROM category \
                WHERE user_id = :user_id ORDER BY id ASC;",
            )?
            .query_map(&[(":user_id", &owner.as_i64())], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }
}

/// Check that `owner` has no category other than `except` called `name`.
///
/// Names are compared after trimming and ignoring case.
fn ensure_unique_name(
    name: &CategoryName,
    owner: UserID,
    except: Option<CategoryId>,
    connection: &Connection,
) -> Result<(), Error> {
    let existing: Vec<Category> = list_owned(owner, connection)?;

    let is_taken = existing
        .iter()
        .any(|category| Some(category.id) != except && category.name.matches(name));

    if is_taken {
        Err(Error::DuplicateCategoryName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Create a category owned by `owner` and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategoryName] if `owner` already has a category with the same name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    owner: UserID,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    ensure_unique_name(&new_category.name, owner, None, connection)?;

    let created_at = current_timestamp();

    connection.execute(
        "INSERT INTO category (user_id, name, color, icon, created_at) VALUES (?1, ?2, ?3, ?4, ?5);",
        (
            owner.as_i64(),
            new_category.name.as_ref(),
            &new_category.color,
            &new_category.icon,
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id: owner,
        name: new_category.name,
        color: new_category.color,
        icon: new_category.icon,
        created_at,
    })
}

/// Apply `update` to the category `category_id` owned by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or is owned by
/// another user, or [Error::DuplicateCategoryName] if the new name is taken by
/// another of the user's categories.
pub fn update_category(
    category_id: CategoryId,
    owner: UserID,
    update: CategoryUpdate,
    connection: &Connection,
) -> Result<Category, Error> {
    let category: Category = get_owned(category_id, owner, connection)?;

    if let Some(name) = &update.name {
        ensure_unique_name(name, owner, Some(category.id), connection)?;
    }
    let category = update.apply(category);

    connection.execute(
        "UPDATE category SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4 AND user_id = ?5",
        (
            category.name.as_ref(),
            &category.color,
            &category.icon,
            category.id,
            owner.as_i64(),
        ),
    )?;

    Ok(category)
}

/// Delete the category `category_id` owned by `owner` along with all of its
/// transactions.
///
/// The transactions are deleted before the category in a single SQL
/// transaction.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or is owned by
/// another user.
pub fn delete_category(
    category_id: CategoryId,
    owner: UserID,
    connection: &Connection,
) -> Result<bool, Error> {
    let category: Category = get_owned(category_id, owner, connection)?;

    let transaction = connection.unchecked_transaction()?;

    let deleted_transactions = transaction.execute(
        "DELETE FROM \"transaction\" WHERE category_id = ?1",
        [category.id],
    )?;
    transaction.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category.id, owner.as_i64()),
    )?;

    transaction.commit()?;

    tracing::debug!(
        "Deleted category {} and {deleted_transactions} of its transactions",
        category.id
    );

    Ok(true)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id = row.get(1)?;
    let raw_name: String = row.get(2)?;

    Ok(Category {
        id,
        user_id: UserID::new(raw_user_id),
        name: CategoryName::new_unchecked(&raw_name),
        color: row.get(3)?,
        icon: row.get(4)?,
        created_at: row.get(5)?,
    })
}
