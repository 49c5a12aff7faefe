//! Settings for signing and checking bearer tokens.

use crate::auth::TokenConfig;

/// Signing keys shorter than this many bytes are accepted but warned about.
pub const MIN_RECOMMENDED_KEY_LENGTH: usize = 32;

/// The signing key used when none is configured. Only suitable for local testing.
pub const PLACEHOLDER_KEY: &str = "insecure-placeholder-key-change-me";
/// The token issuer used when none is configured.
pub const DEFAULT_ISSUER: &str = "expense-tracker";
/// The token audience used when none is configured.
pub const DEFAULT_AUDIENCE: &str = "expense-tracker";

/// The resolved token settings.
#[derive(Clone, PartialEq)]
pub struct AuthConfig {
    /// The secret used to sign tokens.
    pub signing_key: String,
    /// The `iss` claim written to and required of every token.
    pub issuer: String,
    /// The `aud` claim written to and required of every token.
    pub audience: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"********")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl AuthConfig {
    /// Fill in any missing setting with a placeholder and warn about it.
    ///
    /// Blank values count as missing. A warning is also logged when the
    /// signing key is shorter than [MIN_RECOMMENDED_KEY_LENGTH] bytes.
    pub fn resolve(
        signing_key: Option<String>,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Self {
        let signing_key = or_placeholder(signing_key, "signing key", PLACEHOLDER_KEY);
        let issuer = or_placeholder(issuer, "issuer", DEFAULT_ISSUER);
        let audience = or_placeholder(audience, "audience", DEFAULT_AUDIENCE);

        if signing_key.len() < MIN_RECOMMENDED_KEY_LENGTH {
            tracing::warn!(
                "The token signing key is only {} bytes long, use at least {MIN_RECOMMENDED_KEY_LENGTH} bytes.",
                signing_key.len()
            );
        }

        Self {
            signing_key,
            issuer,
            audience,
        }
    }

    /// Build the keys for signing and checking tokens.
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig::new(self.signing_key.as_bytes(), &self.issuer, &self.audience)
    }
}

fn or_placeholder(value: Option<String>, setting: &str, placeholder: &str) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            tracing::warn!(
                "No token {setting} was configured, falling back to the insecure default \"{placeholder}\"."
            );
            placeholder.to_owned()
        }
    }
}
