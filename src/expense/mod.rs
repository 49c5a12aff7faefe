//! Expenses: money a user spent on a given day, filed under a category.

mod core;
pub mod date_format;
pub(crate) mod create_endpoint;
pub(crate) mod delete_endpoint;
pub(crate) mod edit_endpoint;
pub(crate) mod get_endpoint;
mod query;

pub use core::{
    Amount, Expense, ExpenseId, NewExpense, create_expense, create_expense_table, delete_expense,
    get_expense, update_expense, validate_amount,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::update_expense_endpoint;
pub use get_endpoint::{get_expense_endpoint, list_expenses_endpoint};
pub use query::{DateWindow, ExpenseFilter, ExpenseQuery, ListExpensesParams, query_expenses};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;
use utoipa::ToSchema;
use validator::Validate;

use crate::{AppState, category::CategoryId, pagination::PaginationConfig, user::UserId};

/// The state needed by the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The defaults for paging through expenses.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The request body for creating or replacing an expense.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    /// What was bought.
    #[validate(length(min = 1, max = 128, message = "must be between 1 and 128 characters long"))]
    #[schema(example = "Coffee", min_length = 1, max_length = 128)]
    pub name: String,
    /// How much was paid.
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = f64, example = 3.5, minimum = 0.01, maximum = 99999999.99)]
    pub amount: Decimal,
    /// When it was bought, as "MM/DD/YYYY". ISO 8601 dates are also accepted.
    #[serde(deserialize_with = "date_format::deserialize")]
    #[schema(value_type = String, example = "01/15/2024")]
    pub purchase_date: Date,
    /// The category to file the expense under.
    #[validate(range(min = 1, message = "must be a positive category ID"))]
    #[schema(value_type = i32, example = 1, minimum = 1)]
    pub category_id: CategoryId,
}

impl ExpenseRequest {
    /// Attach the request to its owner.
    ///
    /// The amount must have been validated already.
    fn into_new_expense(self, user_id: UserId) -> NewExpense {
        NewExpense {
            name: self.name,
            amount: Amount::new_unchecked(self.amount),
            purchase_date: self.purchase_date,
            category_id: self.category_id,
            user_id,
        }
    }
}


#[cfg(test)]
mod request_tests {
    use rust_decimal::Decimal;
    use time::macros::date;
    use validator::Validate;

    use crate::validation::FieldErrors;

    use super::ExpenseRequest;

    #[test]
    fn parses_month_first_purchase_date() {
        let request: ExpenseRequest = serde_json::from_str(
            r#"{"name":"Coffee","amount":4.50,"purchaseDate":"03/01/2024","categoryId":1}"#,
        )
        .unwrap();

        assert_eq!(request.purchase_date, date!(2024 - 03 - 01));
        assert_eq!(request.amount, Decimal::new(450, 2));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_amount_and_category() {
        let request = ExpenseRequest {
            name: "Coffee".to_owned(),
            amount: Decimal::new(-450, 2),
            purchase_date: date!(2024 - 03 - 01),
            category_id: 0,
        };

        let errors: FieldErrors = request.validate().unwrap_err().into();

        assert_eq!(
            errors.get("amount"),
            Some(["must be greater than zero".to_owned()].as_slice())
        );
        assert!(errors.get("categoryId").is_some());
    }

    #[test]
    fn rejects_empty_and_long_names() {
        let mut request = ExpenseRequest {
            name: String::new(),
            amount: Decimal::new(450, 2),
            purchase_date: date!(2024 - 03 - 01),
            category_id: 1,
        };
        assert!(request.validate().is_err());

        request.name = "x".repeat(129);
        assert!(request.validate().is_err());

        request.name = "x".repeat(128);
        assert!(request.validate().is_ok());
    }
}
