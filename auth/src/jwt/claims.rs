use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Name of the claim carrying the subject's email address.
pub const EMAIL_CLAIM: &str = "email";

/// JWT claims carried by an identity token.
///
/// `exp` and `iat` are the RFC 7519 registered claims. Everything else,
/// including the email, travels in the flattened `extra` map and is read back
/// through checked accessors so a token of a different shape produces an
/// error instead of a panic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create identity claims for an email, issued now.
    ///
    /// # Arguments
    /// * `email` - Email address asserted by the token
    /// * `ttl` - Lifetime of the token
    pub fn for_email(email: &str, ttl: Duration) -> Self {
        let now = Utc::now();

        Self::new()
            .with_issued_at(now.timestamp())
            .with_expiration((now + ttl).timestamp())
            .with_extra(EMAIL_CLAIM, email)
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Read the email claim.
    ///
    /// # Errors
    /// * `MissingClaim` - The token carries no email claim
    /// * `InvalidClaim` - The email claim is not a JSON string
    pub fn email(&self) -> Result<&str, JwtError> {
        self.string_claim(EMAIL_CLAIM)
    }

    fn string_claim(&self, name: &str) -> Result<&str, JwtError> {
        let value = self
            .extra
            .get(name)
            .ok_or_else(|| JwtError::MissingClaim(name.to_string()))?;

        value
            .as_str()
            .ok_or_else(|| JwtError::InvalidClaim(format!("{} must be a string", name)))
    }
}
