//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application, as stored in the database.
///
/// This type carries the password hash and is deliberately not serializable.
/// Convert it into a [UserResponse] before sending it to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The data needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user's ID.
    #[schema(value_type = i64, example = 1)]
    pub id: UserId,
    /// The unique name the user logs in with.
    #[schema(example = "alice")]
    pub username: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Create the user table.
///
/// Usernames are unique regardless of case.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL COLLATE NOCASE UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateUsername] if the username is already registered,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "INSERT INTO user (username, first_name, last_name, password)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, username, first_name, last_name, password",
        )?
        .query_row(
            (
                &new_user.username,
                &new_user.first_name,
                &new_user.last_name,
                new_user.password_hash.as_ref(),
            ),
            map_user_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateUsername(new_user.username.clone()),
            error => error.into(),
        })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, username, first_name, last_name, password FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered under `username`, ignoring case.
///
/// # Errors
///
/// Returns [Error::NotFound] if nobody is registered under `username`.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, username, first_name, last_name, password FROM user WHERE username = :username",
        )?
        .query_row(&[(":username", username)], map_user_row)
        .map_err(|error| error.into())
}

/// Get every registered user ordered by ID.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_all_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare("SELECT id, username, first_name, last_name, password FROM user ORDER BY id ASC")?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(|error| error.into()))
        .collect()
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
pub fn update_password(
    user_id: UserId,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

pub(super) fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserId::new(row.get(0)?);
    let username = row.get(1)?;
    let first_name = row.get(2)?;
    let last_name = row.get(3)?;
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id,
        username,
        first_name,
        last_name,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}
