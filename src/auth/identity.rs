//! The extractor that authenticates requests to protected routes.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    Error,
    auth::{Claims, TokenConfig},
    user::UserId,
};

/// The authenticated caller, read from a valid bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The caller's user ID.
    pub user_id: UserId,
    /// The caller's username.
    pub username: String,
    /// The caller's first name.
    pub first_name: String,
    /// The caller's last name.
    pub last_name: String,
}

impl TryFrom<Claims> for Identity {
    type Error = Error;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .sub
            .parse()
            .map(UserId::new)
            .map_err(|_| Error::InvalidToken)?;

        Ok(Self {
            user_id,
            username: claims.username,
            first_name: claims.given_name,
            last_name: claims.family_name,
        })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    TokenConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::InvalidToken)?;

        let token_config = TokenConfig::from_ref(state);
        let claims = token_config.validate(bearer.token())?;

        Identity::try_from(claims)
    }
}
