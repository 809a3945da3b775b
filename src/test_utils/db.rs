use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    db::initialize,
    password::PasswordHash,
    user::{User, create_user},
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> User {
    create_user(
        EmailAddress::from_str(email).expect("Could not parse test email"),
        "Test User",
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}
