//! Request validation: field level error reports and extractors that reject invalid input
//! before it reaches a route handler.

use std::{collections::BTreeMap, fmt::Display};

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::Error;

/// Validation messages keyed by the camelCase name of the offending field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(example = json!({"amount": ["must be greater than zero"]}))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_owned());
    }

    /// The messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let descriptions: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();

        write!(f, "{}", descriptions.join("; "))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors = FieldErrors::default();

        for (field, errors) in errors.field_errors() {
            let field = to_camel_case(&field);

            for error in errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("failed the \"{}\" check", error.code));
                field_errors.add(&field, &message);
            }
        }

        field_errors
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors.into())
    }
}

fn to_camel_case(snake_case: &str) -> String {
    let mut camel_case = String::with_capacity(snake_case.len());
    let mut capitalise_next = false;

    for c in snake_case.chars() {
        if c == '_' {
            capitalise_next = true;
        } else if capitalise_next {
            camel_case.extend(c.to_uppercase());
            capitalise_next = false;
        } else {
            camel_case.push(c);
        }
    }

    camel_case
}

/// A JSON request body that has been deserialized and validated.
///
/// Syntax errors are reported as [Error::MalformedBody] and failed checks as
/// [Error::Validation], both of which render as 400 Bad Request.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| Error::MalformedBody(rejection.body_text()))?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// A query string that has been deserialized and validated.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::MalformedBody(rejection.body_text()))?;

        value.validate()?;

        Ok(Self(value))
    }
}

/// Path parameters, such as a resource ID, that have been deserialized.
///
/// Parameters that do not parse, e.g. a non-numeric ID, are reported as
/// [Error::MalformedBody] so that the response is JSON like every other error.
#[derive(Debug)]
pub struct ValidatedPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| Error::MalformedBody(rejection.body_text()))?;

        Ok(Self(value))
    }
}
