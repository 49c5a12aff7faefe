//! Core category types and database operations.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::Error;

/// Database identifier for a category.
pub type CategoryId = i32;

/// The categories every new database starts with.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Groceries",
    "Leisure",
    "Electronics",
    "Utilities",
    "Clothing",
    "Health",
    "Others",
];

/// A shared label for grouping expenses (e.g., 'Groceries', 'Utilities').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// The ID of the category.
    #[schema(value_type = i32, example = 1)]
    pub id: CategoryId,
    /// The unique name of the category.
    #[schema(example = "Groceries")]
    pub name: String,
    /// An optional longer description.
    pub description: Option<String>,
}

/// The request body for creating or replacing a category.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "Pets", "description": "Food and vet bills"}))]
pub struct CategoryRequest {
    /// The unique name of the category.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub name: String,
    /// An optional longer description.
    #[validate(length(max = 255, message = "must be at most 255 characters long"))]
    pub description: Option<String>,
}

/// Create the category table.
///
/// Category names are unique regardless of case.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            description TEXT
        )",
        (),
    )?;

    Ok(())
}

/// Insert the [DEFAULT_CATEGORIES] that are not in the database yet.
///
/// Safe to call on every start up.
pub fn seed_default_categories(connection: &Connection) -> Result<(), Error> {
    let mut statement = connection.prepare("INSERT OR IGNORE INTO category (name) VALUES (?1)")?;

    for name in DEFAULT_CATEGORIES {
        statement.execute((name,))?;
    }

    Ok(())
}

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if a category with the same name,
/// ignoring case, already exists.
pub fn create_category(
    name: &str,
    description: Option<&str>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (name, description) VALUES (?1, ?2)
            RETURNING id, name, description",
        )?
        .query_row((name, description), map_row)
        .map_err(|error| map_duplicate_name(error, name))
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, description FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered by ID.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category ORDER BY id ASC")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Overwrite the name and description of a category.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category doesn't exist, or
/// [Error::DuplicateCategoryName] if the new name is used by another category.
pub fn update_category(
    category_id: CategoryId,
    name: &str,
    description: Option<&str>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "UPDATE category SET name = ?1, description = ?2 WHERE id = ?3
            RETURNING id, name, description",
        )?
        .query_row((name, description, category_id), map_row)
        .map_err(|error| map_duplicate_name(error, name))
}

/// Delete a category by ID.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category doesn't exist, or
/// [Error::CategoryInUse] if an expense still refers to it.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection
        .execute("DELETE FROM category WHERE id = ?1", [category_id])
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(error, _)
                if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::CategoryInUse
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_duplicate_name(error: rusqlite::Error, name: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(error, _)
            if error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::DuplicateCategoryName(name.to_owned())
        }
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        category::{
            DEFAULT_CATEGORIES, create_category, delete_category, get_all_categories,
            get_category, seed_default_categories, update_category,
        },
    };

    use super::create_category_table;

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_category_table(&connection).expect("Could not create category table");
        connection
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();

        let category = create_category("Rent", Some("Monthly rent"), &connection)
            .expect("Could not create category");

        assert!(category.id > 0);
        assert_eq!(category.name, "Rent");
        assert_eq!(category.description.as_deref(), Some("Monthly rent"));
    }

    #[test]
    fn create_category_rejects_duplicate_name_ignoring_case() {
        let connection = get_test_db_connection();
        create_category("Rent", None, &connection).unwrap();

        let result = create_category("rent", None, &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("rent".to_owned())));
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        let result = get_category(123, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn seeding_is_idempotent() {
        let connection = get_test_db_connection();

        seed_default_categories(&connection).unwrap();
        seed_default_categories(&connection).unwrap();

        let names: Vec<String> = get_all_categories(&connection)
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, DEFAULT_CATEGORIES);
    }

    #[test]
    fn update_category_overwrites_fields() {
        let connection = get_test_db_connection();
        let category = create_category("Rent", Some("Monthly rent"), &connection).unwrap();

        let updated = update_category(category.id, "Housing", None, &connection).unwrap();

        assert_eq!(updated.id, category.id);
        assert_eq!(updated.name, "Housing");
        assert_eq!(updated.description, None);
        assert_eq!(get_category(category.id, &connection), Ok(updated));
    }

    #[test]
    fn update_category_to_existing_name_fails() {
        let connection = get_test_db_connection();
        create_category("Rent", None, &connection).unwrap();
        let other = create_category("Travel", None, &connection).unwrap();

        let result = update_category(other.id, "RENT", None, &connection);

        assert_eq!(result, Err(Error::DuplicateCategoryName("RENT".to_owned())));
    }

    #[test]
    fn update_missing_category_returns_not_found() {
        let connection = get_test_db_connection();

        let result = update_category(42, "Rent", None, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_category_succeeds() {
        let connection = get_test_db_connection();
        let category = create_category("Rent", None, &connection).unwrap();

        delete_category(category.id, &connection).unwrap();

        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_category_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(delete_category(42, &connection), Err(Error::NotFound));
    }
}
