use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    auth::{Email, PasswordHash, User, create_user},
    db::initialize,
};

/// Not a real bcrypt hash, so no password will match it.
const TEST_PASSWORD_HASH: &str = "not-a-real-hash";

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn get_shared_test_connection() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(get_test_connection()))
}

/// Insert a user with a placeholder password hash.
///
/// Use this when a test needs an owner for subscriptions but never logs in.
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        Email::new(email).expect("Invalid test email"),
        PasswordHash::new_unchecked(TEST_PASSWORD_HASH),
        connection,
    )
    .expect("Could not create test user")
}
