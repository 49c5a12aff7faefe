//! Listing a user's expenses one page at a time, optionally restricted to a
//! window of purchase dates.

use std::str::FromStr;

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Deserialize;
use time::{Date, Duration, Month};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    Error,
    expense::{
        Expense,
        core::{EXPENSE_COLUMNS, map_row},
        date_format,
    },
    pagination::{Page, PaginationConfig},
    user::UserId,
    validation::FieldErrors,
};

/// A named window of purchase dates.
///
/// Names are matched regardless of case. The numbers 0 to 3 select the
/// filters in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(try_from = "String")]
pub enum ExpenseFilter {
    /// The last seven days.
    LastWeek,
    /// The last calendar month.
    LastMonth,
    /// The last three calendar months.
    LastThreeMonths,
    /// The range given by a start and end date.
    Custom,
}

impl FromStr for ExpenseFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let filter = match value.trim().to_ascii_lowercase().as_str() {
            "lastweek" | "0" => Self::LastWeek,
            // "LasMonth" is an older spelling still sent by some clients.
            "lastmonth" | "lasmonth" | "1" => Self::LastMonth,
            "lastthreemonths" | "2" => Self::LastThreeMonths,
            "custom" | "3" => Self::Custom,
            _ => {
                return Err(format!(
                    "unknown filter \"{value}\", expected LastWeek, LastMonth, LastThreeMonths or Custom"
                ));
            }
        };

        Ok(filter)
    }
}

impl TryFrom<String> for ExpenseFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The query string accepted when listing expenses.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListExpensesParams {
    /// The 1-based page number.
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[param(minimum = 1, example = 1)]
    pub page: Option<u64>,
    /// The maximum number of expenses on a page.
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[param(minimum = 1, example = 10)]
    pub records_per_page: Option<u64>,
    /// The window of purchase dates to return.
    pub filter: Option<ExpenseFilter>,
    /// The first purchase date of a custom window.
    #[serde(default, deserialize_with = "date_format::option::deserialize")]
    #[param(value_type = Option<String>, example = "01/01/2024")]
    pub start_date: Option<Date>,
    /// The last purchase date of a custom window.
    #[serde(default, deserialize_with = "date_format::option::deserialize")]
    #[param(value_type = Option<String>, example = "01/31/2024")]
    pub end_date: Option<Date>,
}

/// An inclusive window of purchase dates. A missing end means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// The earliest purchase date to include.
    pub start: Date,
    /// The latest purchase date to include.
    pub end: Option<Date>,
}

/// A resolved request for one page of a user's expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// The owner of the expenses.
    pub user_id: UserId,
    /// Only expenses bought within this window are returned.
    pub window: Option<DateWindow>,
    /// The page to return.
    pub page: Page,
}

impl ExpenseQuery {
    /// Resolve the query string of a listing request relative to `today`.
    ///
    /// Start and end dates are only used by the custom filter.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if a custom filter is missing a date or
    /// its start date comes after its end date.
    pub fn new(
        user_id: UserId,
        params: ListExpensesParams,
        pagination_config: &PaginationConfig,
        today: Date,
    ) -> Result<Self, Error> {
        let window = match params.filter {
            Some(ExpenseFilter::Custom) => Some(custom_window(params.start_date, params.end_date)?),
            Some(filter) => Some(DateWindow {
                start: window_start(filter, today),
                end: None,
            }),
            None => None,
        };

        Ok(Self {
            user_id,
            window,
            page: Page::new(params.page, params.records_per_page, pagination_config),
        })
    }
}

fn custom_window(start: Option<Date>, end: Option<Date>) -> Result<DateWindow, Error> {
    let mut errors = FieldErrors::default();

    if start.is_none() {
        errors.add("startDate", "is required when filter is Custom");
    }

    if end.is_none() {
        errors.add("endDate", "is required when filter is Custom");
    }

    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(DateWindow {
            start,
            end: Some(end),
        }),
        (Some(_), Some(_)) => {
            errors.add("startDate", "must not be after endDate");
            Err(Error::Validation(errors))
        }
        _ => Err(Error::Validation(errors)),
    }
}

/// The earliest purchase date included by a relative filter.
///
/// Month arithmetic keeps the day of the month, clamped to the length of the
/// target month, e.g. one month before March 31 is February 28 or 29.
fn window_start(filter: ExpenseFilter, today: Date) -> Date {
    match filter {
        ExpenseFilter::LastWeek => today.checked_sub(Duration::days(7)).unwrap_or(Date::MIN),
        ExpenseFilter::LastMonth => months_before(today, 1),
        ExpenseFilter::LastThreeMonths => months_before(today, 3),
        // Custom windows carry their own start date.
        ExpenseFilter::Custom => today,
    }
}

fn months_before(date: Date, months: i32) -> Date {
    let month_index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months;
    let year = month_index.div_euclid(12);
    // `rem_euclid` keeps the index in 0..12, so the cast cannot truncate.
    let Ok(month) = Month::try_from(month_index.rem_euclid(12) as u8 + 1) else {
        return Date::MIN;
    };
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN)
}

/// Get one page of the expenses matching `query`, ordered by ID.
///
/// Ownership and the date window are applied before the page is cut, so a
/// page is only short when it is the last one.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn query_expenses(query: &ExpenseQuery, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut query_string_parts = vec![format!("SELECT {EXPENSE_COLUMNS}")];
    let mut where_clause_parts = vec!["expense.user_id = ?1".to_owned()];
    let mut query_parameters = vec![Value::Integer(query.user_id.as_i64())];

    if let Some(window) = query.window {
        query_parameters.push(Value::Text(window.start.to_string()));
        where_clause_parts.push(format!(
            "expense.purchase_date >= ?{}",
            query_parameters.len()
        ));

        if let Some(end) = window.end {
            query_parameters.push(Value::Text(end.to_string()));
            where_clause_parts.push(format!(
                "expense.purchase_date <= ?{}",
                query_parameters.len()
            ));
        }
    }

    query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
    query_string_parts.push("ORDER BY expense.id ASC".to_owned());

    query_parameters.push(Value::Integer(query.page.limit()));
    query_parameters.push(Value::Integer(query.page.offset()));
    query_string_parts.push(format!(
        "LIMIT ?{} OFFSET ?{}",
        query_parameters.len() - 1,
        query_parameters.len()
    ));

    let query_string = query_string_parts.join(" ");
    let params = params_from_iter(query_parameters.iter());

    connection
        .prepare(&query_string)?
        .query_map(params, map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}
