use std::sync::PoisonError;
use std::sync::RwLock;

use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

const MIN_SECRET_LEN: usize = 32;

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &[u8]) -> Self {
        if secret.len() < MIN_SECRET_LEN {
            tracing::warn!(
                secret_len = secret.len(),
                min_len = MIN_SECRET_LEN,
                "JWT signing secret is shorter than recommended for HS256"
            );
        }

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Current signing key plus the key it replaced, if any.
struct KeyRing {
    current: SigningKey,
    previous: Option<SigningKey>,
}

/// JWT token handler for encoding and decoding tokens.
///
/// Signs with HS256 using the current key. Verification accepts the current
/// key and, while a rotation is in progress, the immediately prior one.
pub struct JwtHandler {
    keys: RwLock<KeyRing>,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes)
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: RwLock::new(KeyRing {
                current: SigningKey::from_secret(secret),
                previous: None,
            }),
            algorithm: Algorithm::HS256,
        }
    }

    /// Also accept tokens signed with a previously active secret.
    pub fn with_previous(self, secret: &[u8]) -> Self {
        {
            let mut ring = self.keys.write().unwrap_or_else(PoisonError::into_inner);
            ring.previous = Some(SigningKey::from_secret(secret));
        }
        self
    }

    /// Start signing with a new secret.
    ///
    /// The current key is demoted to the previous slot so tokens it signed
    /// keep verifying; the key before it stops being accepted.
    pub fn rotate(&self, secret: &[u8]) {
        let mut ring = self.keys.write().unwrap_or_else(PoisonError::into_inner);
        let demoted = std::mem::replace(&mut ring.current, SigningKey::from_secret(secret));
        ring.previous = Some(demoted);

        tracing::info!("JWT signing key rotated");
    }

    /// Encode claims into a JWT token with the current key.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);
        let ring = self.keys.read().unwrap_or_else(PoisonError::into_inner);

        encode(&header, claims, &ring.current.encoding)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// The signature is checked before any claim is looked at, so a forged
    /// token is always `InvalidToken` even when its `exp` lies in the past.
    /// An `exp` claim is required and no leeway is granted.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed or signed by an unknown key
    /// * `TokenExpired` - Signature is valid but `exp` has passed
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        let ring = self.keys.read().unwrap_or_else(PoisonError::into_inner);

        let result = match decode::<T>(token, &ring.current.decoding, &validation) {
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => match &ring.previous {
                Some(previous) => decode::<T>(token, &previous.decoding, &validation),
                None => Err(e),
            },
            other => other,
        };

        result.map(|data| data.claims).map_err(classify)
    }
}

fn classify(err: JsonWebTokenError) -> JwtError {
    match err.kind() {
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::InvalidSignature => JwtError::InvalidToken("signature mismatch".to_string()),
        ErrorKind::MissingRequiredClaim(claim) => {
            JwtError::InvalidToken(format!("missing required claim {}", claim))
        }
        _ => JwtError::InvalidToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde::Deserialize;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestClaims {
        email: String,
        exp: i64,
    }

    fn claims_expiring_in(seconds: i64) -> TestClaims {
        TestClaims {
            email: "u@x.com".to_string(),
            exp: Utc::now().timestamp() + seconds,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(SECRET);
        let claims = claims_expiring_in(3600);

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: TestClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_garbage() {
        let handler = JwtHandler::new(SECRET);

        for token in ["garbage", "invalid.token.here", ""] {
            let result = handler.decode::<TestClaims>(token);
            assert!(matches!(result, Err(JwtError::InvalidToken(_))), "{token}");
        }
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&claims_expiring_in(3600))
            .expect("Failed to encode token");

        let result = handler2.decode::<TestClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(&claims_expiring_in(-3600))
            .expect("Failed to encode token");

        assert_eq!(
            handler.decode::<TestClaims>(&token),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_forged_expired_token_is_invalid_not_expired() {
        let forger = JwtHandler::new(b"attacker_secret_at_least_32_bytes!!");
        let handler = JwtHandler::new(SECRET);

        let token = forger
            .encode(&claims_expiring_in(-3600))
            .expect("Failed to encode token");

        assert!(matches!(
            handler.decode::<TestClaims>(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_missing_exp_is_invalid() {
        #[derive(Serialize, Deserialize)]
        struct NoExp {
            email: String,
        }

        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(&NoExp {
                email: "u@x.com".to_string(),
            })
            .expect("Failed to encode token");

        assert!(matches!(
            handler.decode::<NoExp>(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_rotation_accepts_previous_key() {
        let handler = JwtHandler::new(b"first_secret_at_least_32_bytes_long!");
        let old_token = handler
            .encode(&claims_expiring_in(3600))
            .expect("Failed to encode token");

        handler.rotate(b"second_secret_at_least_32_bytes_long");
        let new_token = handler
            .encode(&claims_expiring_in(3600))
            .expect("Failed to encode token");

        assert!(handler.decode::<TestClaims>(&old_token).is_ok());
        assert!(handler.decode::<TestClaims>(&new_token).is_ok());

        handler.rotate(b"third_secret_at_least_32_bytes_long!");
        assert!(matches!(
            handler.decode::<TestClaims>(&old_token),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(handler.decode::<TestClaims>(&new_token).is_ok());
    }

    #[test]
    fn test_with_previous() {
        let old = JwtHandler::new(b"old_secret_at_least_32_bytes_long!!!");
        let token = old
            .encode(&claims_expiring_in(3600))
            .expect("Failed to encode token");

        let handler = JwtHandler::new(SECRET).with_previous(b"old_secret_at_least_32_bytes_long!!!");
        assert!(handler.decode::<TestClaims>(&token).is_ok());
    }

    #[test]
    fn test_expired_token_from_previous_key() {
        let handler = JwtHandler::new(b"first_secret_at_least_32_bytes_long!");
        let token = handler
            .encode(&claims_expiring_in(-60))
            .expect("Failed to encode token");

        handler.rotate(SECRET);
        assert_eq!(
            handler.decode::<TestClaims>(&token),
            Err(JwtError::TokenExpired)
        );
    }
}
