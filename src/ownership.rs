//! The authorization guard shared by every resource that belongs to a user.
//!
//! Reads and writes of categories and transactions go through [get_owned] or
//! [list_owned] so that the ownership check lives in one place.

use rusqlite::Connection;

use crate::{Error, database_id::DatabaseId, user::UserID};

/// A resource that belongs to exactly one user.
pub trait OwnedResource: Sized {
    /// A human readable name of the resource kind for logs.
    const KIND: &'static str;

    /// The user that owns the resource.
    fn owner(&self) -> UserID;

    /// Fetch the resource with `id` regardless of who owns it.
    ///
    /// Implementers should return [Error::NotFound] if there is no such resource.
    fn select_by_id(id: DatabaseId, connection: &Connection) -> Result<Self, Error>;

    /// Fetch every resource of this kind owned by `owner`.
    fn select_by_owner(owner: UserID, connection: &Connection) -> Result<Vec<Self>, Error>;
}

/// Fetch the resource with `id` if it is owned by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the resource does not exist **or** if it
/// belongs to another user. The two cases are indistinguishable to callers.
pub fn get_owned<R: OwnedResource>(
    id: DatabaseId,
    owner: UserID,
    connection: &Connection,
) -> Result<R, Error> {
    let resource = R::select_by_id(id, connection)?;

    if resource.owner() == owner {
        Ok(resource)
    } else {
        tracing::warn!(
            "User {owner} tried to access {} {id} owned by user {}",
            R::KIND,
            resource.owner()
        );
        Err(Error::NotFound)
    }
}

/// Fetch every resource of kind `R` owned by `owner`.
pub fn list_owned<R: OwnedResource>(
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<R>, Error> {
    R::select_by_owner(owner, connection)
}
