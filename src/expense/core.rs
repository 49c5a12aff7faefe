//! Core expense types and the database operations on single expenses.

use std::{borrow::Cow, fmt::Display};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::{Error, category::CategoryId, user::UserId};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A positive amount of money with at most two decimal places.
///
/// Stored in the database as an integer number of cents and sent to clients
/// as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// The largest amount an expense may have, in cents.
    pub const MAX_CENTS: i64 = 9_999_999_999;

    /// Create a validated amount.
    ///
    /// # Errors
    ///
    /// This function will return a [ValidationError] if `amount` is zero or
    /// negative, has more than two decimal places, or exceeds 99,999,999.99.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::new("amount_not_positive")
                .with_message(Cow::Borrowed("must be greater than zero")));
        }

        if amount.normalize().scale() > 2 {
            return Err(ValidationError::new("amount_precision")
                .with_message(Cow::Borrowed("must have at most two decimal places")));
        }

        if amount > Decimal::new(Self::MAX_CENTS, 2) {
            return Err(ValidationError::new("amount_too_large")
                .with_message(Cow::Borrowed("must be at most 99999999.99")));
        }

        Ok(Self(amount))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `amount` is positive, has at most two
    /// decimal places and is no larger than [Amount::MAX_CENTS] cents.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid amount is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount in whole cents.
    pub fn cents(&self) -> i128 {
        let mut amount = self.0;
        amount.rescale(2);
        amount.mantissa()
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let cents = i64::try_from(self.cents())
            .map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))?;

        Ok(ToSqlOutput::from(cents))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(|cents| Self(Decimal::new(cents, 2)))
    }
}

/// Validator hook for request bodies that carry a raw [Decimal] amount.
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    Amount::new(*amount).map(|_| ())
}

/// An expense as shown to its owner, with the category name resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    #[schema(value_type = i64, example = 1)]
    pub id: ExpenseId,
    /// What was bought.
    #[schema(example = "Coffee")]
    pub name: String,
    /// How much was paid.
    #[schema(value_type = f64, example = 3.5)]
    pub amount: Amount,
    /// When it was bought.
    #[serde(with = "crate::expense::date_format")]
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub purchase_date: Date,
    /// The name of the expense's category.
    #[schema(example = "Groceries")]
    pub category: String,
    /// The ID of the expense's category.
    #[schema(value_type = i32, example = 1)]
    pub category_id: CategoryId,
}

/// The data needed to record an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What was bought.
    pub name: String,
    /// How much was paid.
    pub amount: Amount,
    /// When it was bought.
    pub purchase_date: Date,
    /// The category to file the expense under.
    pub category_id: CategoryId,
    /// The user that owns the expense.
    pub user_id: UserId,
}

/// Create the expense table.
///
/// Deleting a user deletes their expenses. Deleting a category that is
/// still used by an expense fails.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            purchase_date TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES category(id) ON DELETE RESTRICT,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// The columns selected for an [Expense], in the order [map_row] reads them.
pub(super) const EXPENSE_COLUMNS: &str = "expense.id, expense.name, expense.amount, \
    expense.purchase_date, category.name, expense.category_id \
    FROM expense INNER JOIN category ON category.id = expense.category_id";

/// Record a new expense.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist,
/// [Error::InvalidUser] if the user does not exist,
/// or [Error::SqlError] if some other SQL error occurred.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    connection
        .execute(
            "INSERT INTO expense (name, amount, purchase_date, category_id, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &new_expense.name,
                new_expense.amount,
                new_expense.purchase_date,
                new_expense.category_id,
                new_expense.user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, _)
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                dangling_reference(new_expense.category_id, new_expense.user_id, connection)
            }
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    get_expense(id, new_expense.user_id, connection)
}

/// Retrieve an expense owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to another user.
pub fn get_expense(
    expense_id: ExpenseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} WHERE expense.id = ?1 AND expense.user_id = ?2"
        ))?
        .query_row((expense_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Overwrite the fields of an expense owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to
/// another user, or [Error::InvalidCategory] if the category does not exist.
pub fn update_expense(
    expense_id: ExpenseId,
    update: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE expense
            SET name = ?1, amount = ?2, purchase_date = ?3, category_id = ?4
            WHERE id = ?5 AND user_id = ?6",
            (
                &update.name,
                update.amount,
                update.purchase_date,
                update.category_id,
                expense_id,
                update.user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, _)
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidCategory(update.category_id)
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_expense(expense_id, update.user_id, connection)
}

/// Delete an expense owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to another user.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Work out which reference of a rejected insert was dangling.
fn dangling_reference(category_id: CategoryId, user_id: UserId, connection: &Connection) -> Error {
    let category_exists = connection.query_row(
        "SELECT EXISTS (SELECT 1 FROM category WHERE id = ?1)",
        [category_id],
        |row| row.get::<_, bool>(0),
    );

    match category_exists {
        Ok(false) => Error::InvalidCategory(category_id),
        Ok(true) => Error::InvalidUser(user_id),
        Err(error) => error.into(),
    }
}

pub(super) fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        purchase_date: row.get(3)?,
        category: row.get(4)?,
        category_id: row.get(5)?,
    })
}
