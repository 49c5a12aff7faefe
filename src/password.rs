//! This file defines types that handle password validation and hashing.
//! `ValidatedPassword` wraps a string and ensures it meets the length requirement.
//! `PasswordHash` converts a `ValidatedPassword` into a salted and hashed password.

use bcrypt::{hash, verify};

use crate::Error;

/// A password that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [PasswordHash].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// The minimum number of characters in a password.
    pub const MIN_LENGTH: usize = 8;

    /// Create and validate a new password from a string.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::PasswordTooShort] if the password
    /// has fewer than [ValidatedPassword::MIN_LENGTH] characters.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        if raw_password_string.chars().count() < Self::MIN_LENGTH {
            return Err(Error::PasswordTooShort(Self::MIN_LENGTH));
        }

        Ok(Self(raw_password_string.to_string()))
    }
}

/// A salted and hashed password.
///
/// The bcrypt digest embeds the salt and cost factor, so it is all that is
/// needed to verify a password later on.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Create a hashed password from a validated password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// A value of at least 12 is recommended. Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        match hash(&password.0, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any validation.
    ///
    /// The caller should ensure that `raw_password_hash` is a valid password hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Try to create a password hash from a raw password string.
    ///
    /// This is a convenience function that removes the need to manually create
    /// the intermediate `ValidatedPassword` type.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated_password, cost)
    }

    /// Check that `raw_password` matches the stored password.
    ///
    /// A malformed hash never matches. The underlying error is logged rather
    /// than returned so that callers only deal with match or no match.
    pub fn verify(&self, raw_password: &str) -> bool {
        verify(raw_password, &self.0).unwrap_or_else(|error| {
            tracing::error!("Could not verify password against stored hash: {error}");
            false
        })
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A valid bcrypt digest (cost 12) that no stored user owns.
const DUMMY_HASH: &str = "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

/// Spend the same time as verifying a real password, and always fail.
///
/// Used when a log-in names a user that does not exist, so the response time
/// does not reveal whether the username is registered.
pub fn dummy_verify(raw_password: &str) {
    let _ = verify(raw_password, DUMMY_HASH);
}
