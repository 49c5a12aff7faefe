//! Issuing and validating the signed bearer tokens clients use to authenticate.

use std::fmt::Debug;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::User};

/// How long a token stays valid after it is issued.
pub const TOKEN_LIFETIME: Duration = Duration::hours(8);

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: String,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The user's first name.
    pub given_name: String,
    /// The user's last name.
    pub family_name: String,
    /// Who issued the token.
    pub iss: String,
    /// Who the token is intended for.
    pub aud: String,
    /// When the token was issued, in seconds since the Unix epoch.
    pub iat: i64,
    /// When the token expires, in seconds since the Unix epoch.
    pub exp: i64,
}

/// The keys and settings for signing and checking tokens.
#[derive(Clone)]
pub struct TokenConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenConfig {
    /// Create a config that signs tokens with HMAC-SHA256 using `secret`.
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_owned(),
            audience: audience.to_owned(),
        }
    }

    /// Issue a token for `user` that expires after [TOKEN_LIFETIME].
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue(&self, user: &User) -> Result<String, Error> {
        self.issue_at(user, OffsetDateTime::now_utc())
    }

    /// Issue a token for `user` as if it were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [Error::TokenCreation] if the token could not be signed.
    pub fn issue_at(&self, user: &User, issued_at: OffsetDateTime) -> Result<String, Error> {
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + TOKEN_LIFETIME).unix_timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|error| Error::TokenCreation(error.to_string()))
    }

    /// Check the signature, issuer, audience and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidToken] if any of the checks fail.
    pub fn validate(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|error| {
                tracing::debug!("Rejected bearer token: {error}");
                Error::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error, PasswordHash,
        auth::token::{TOKEN_LIFETIME, TokenConfig},
        user::{User, UserId},
    };

    fn test_user() -> User {
        User {
            id: UserId::new(7),
            username: "alice".to_owned(),
            first_name: "Alice".to_owned(),
            last_name: "Liddell".to_owned(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    fn test_config() -> TokenConfig {
        TokenConfig::new(
            b"a test signing key that is at least 32 bytes",
            "expense-tracker",
            "expense-tracker-clients",
        )
    }

    #[test]
    fn issued_token_carries_identity() {
        let config = test_config();
        let now = OffsetDateTime::now_utc();

        let token = config.issue_at(&test_user(), now).unwrap();
        let claims = config.validate(&token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.given_name, "Alice");
        assert_eq!(claims.family_name, "Liddell");
        assert_eq!(claims.iss, "expense-tracker");
        assert_eq!(claims.aud, "expense-tracker-clients");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME.whole_seconds());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let issued_at = OffsetDateTime::now_utc() - TOKEN_LIFETIME - Duration::hours(1);

        let token = config.issue_at(&test_user(), issued_at).unwrap();

        assert_eq!(config.validate(&token), Err(Error::InvalidToken));
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let other = TokenConfig::new(
            b"some other signing key that is 32 bytes",
            "expense-tracker",
            "expense-tracker-clients",
        );

        let token = other.issue(&test_user()).unwrap();

        assert_eq!(test_config().validate(&token), Err(Error::InvalidToken));
    }

    #[test]
    fn token_for_another_audience_is_rejected() {
        let other = TokenConfig::new(
            b"a test signing key that is at least 32 bytes",
            "expense-tracker",
            "someone-else",
        );

        let token = other.issue(&test_user()).unwrap();

        assert_eq!(test_config().validate(&token), Err(Error::InvalidToken));
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let other = TokenConfig::new(
            b"a test signing key that is at least 32 bytes",
            "impostor",
            "expense-tracker-clients",
        );

        let token = other.issue(&test_user()).unwrap();

        assert_eq!(test_config().validate(&token), Err(Error::InvalidToken));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            test_config().validate("not.a.token"),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn debug_output_hides_keys() {
        let output = format!("{:?}", test_config());

        assert!(output.contains("expense-tracker"));
        assert!(!output.contains("signing key"));
    }
}
