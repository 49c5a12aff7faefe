/*! Setting up the application's database: the schema and the seed data. */

use rusqlite::{Connection, Transaction as SqlTransaction};

pub use crate::category::seed_default_categories;
use crate::{
    Error, PasswordHash,
    category::create_category_table,
    expense::create_expense_table,
    user::{NewUser, User, create_user, create_user_table},
};

/// The username of the account created by [seed_test_user].
pub const TEST_USERNAME: &str = "test";
/// The password of the account created by [seed_test_user].
pub const TEST_PASSWORD: &str = "pass1234";

/// Turn on foreign key enforcement and create any missing tables.
///
/// Foreign keys are enforced per connection, so this must be called on every
/// new connection before it is used.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Create the `test` user if nobody has registered yet.
///
/// Returns the new user, or `None` if the database already has users.
///
/// # Errors
/// This function will return an error if the password could not be hashed or
/// there is an SQL error.
pub fn seed_test_user(connection: &Connection, password_cost: u32) -> Result<Option<User>, Error> {
    let user_count: i64 = connection.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;

    if user_count > 0 {
        return Ok(None);
    }

    let user = create_user(
        NewUser {
            username: TEST_USERNAME.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            password_hash: PasswordHash::from_raw_password(TEST_PASSWORD, password_cost)?,
        },
        connection,
    )?;

    Ok(Some(user))
}
