use std::fmt;

use chrono::Duration;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Signed, time-bound assertion of a user's email.
///
/// Opaque to holders; only [`TokenService::verify`] gives it meaning.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityToken(..)")
    }
}

/// Issues and verifies stateless identity tokens.
///
/// Holds no per-token state: a token is valid exactly as long as its
/// signature matches an accepted key and its `exp` is in the future.
pub struct TokenService {
    jwt_handler: JwtHandler,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Arguments
    /// * `jwt_handler` - Handler owning the signing key ring
    /// * `ttl_hours` - Lifetime of issued tokens
    pub fn new(jwt_handler: JwtHandler, ttl_hours: i64) -> Self {
        Self {
            jwt_handler,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token asserting `email`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue(&self, email: &str) -> Result<IdentityToken, JwtError> {
        let claims = Claims::for_email(email, self.ttl);
        self.jwt_handler.encode(&claims).map(IdentityToken)
    }

    /// Verify a token's signature, then its expiry.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, tampered, or signed by an unknown key
    /// * `TokenExpired` - Authentic but past its `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }

    /// Read the email out of verified claims.
    ///
    /// # Errors
    /// * `MissingClaim` / `InvalidClaim` - Claims do not carry a string email
    pub fn extract_email(claims: &Claims) -> Result<String, JwtError> {
        claims.email().map(str::to_string)
    }

    /// Verify a token and return the email it asserts.
    pub fn verify_email(&self, token: &str) -> Result<String, JwtError> {
        let claims = self.verify(token)?;
        Self::extract_email(&claims)
    }

    /// Sign new tokens with `secret`, still accepting the key it replaces.
    pub fn rotate_key(&self, secret: &[u8]) {
        self.jwt_handler.rotate(secret);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn service() -> TokenService {
        TokenService::new(JwtHandler::new(SECRET), 24)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = service();

        for email in ["u@x.com", "a@b.co", "first.last+tag@sub.example.org"] {
            let token = service.issue(email).expect("Failed to issue token");
            let claims = service.verify(token.as_str()).expect("Failed to verify");
            assert_eq!(TokenService::extract_email(&claims).unwrap(), email);
        }
    }

    #[test]
    fn test_verify_is_idempotent() {
        let service = service();
        let token = service.issue("u@x.com").unwrap();

        let first = service.verify_email(token.as_str()).unwrap();
        let second = service.verify_email(token.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_issued_claims_carry_ttl() {
        let service = service();
        let token = service.issue("u@x.com").unwrap();
        let claims = service.verify(token.as_str()).unwrap();

        assert_eq!(claims.exp.unwrap() - claims.iat.unwrap(), 24 * 60 * 60);
    }

    #[test]
    fn test_verify_garbage_is_invalid() {
        let result = service().verify("garbage");
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_expired() {
        let handler = JwtHandler::new(SECRET);
        let past = Utc::now().timestamp() - 3600;
        let token = handler
            .encode(
                &Claims::new()
                    .with_issued_at(past - 3600)
                    .with_expiration(past)
                    .with_extra("email", "u@x.com"),
            )
            .unwrap();

        assert_eq!(service().verify(&token), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_authentic_token_without_email_fails_extraction() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(
                &Claims::new()
                    .with_expiration(Utc::now().timestamp() + 3600)
                    .with_extra("sub", "someone"),
            )
            .unwrap();

        assert_eq!(
            service().verify_email(&token),
            Err(JwtError::MissingClaim("email".to_string()))
        );
    }

    #[test]
    fn test_rotate_key_keeps_old_tokens_valid() {
        let service = service();
        let old = service.issue("u@x.com").unwrap();

        service.rotate_key(b"rotated_secret_key_at_least_32_bytes");
        let new = service.issue("u@x.com").unwrap();

        assert_eq!(service.verify_email(old.as_str()).unwrap(), "u@x.com");
        assert_eq!(service.verify_email(new.as_str()).unwrap(), "u@x.com");
        assert!(matches!(
            self::service().verify(new.as_str()),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = service().issue("u@x.com").unwrap();
        assert_eq!(format!("{:?}", token), "IdentityToken(..)");
    }
}
