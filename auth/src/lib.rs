//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for services:
//! - Password hashing (Argon2id, per-password random salt)
//! - JWT signing and verification with key rotation
//! - Identity token issuance and validation
//!
//! Each service defines its own authentication traits and adapts these implementations.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::{JwtHandler, TokenService};
//!
//! let tokens = TokenService::new(JwtHandler::new(b"secret_key_at_least_32_bytes_long!"), 24);
//! let token = tokens.issue("u@x.com").unwrap();
//! let claims = tokens.verify(token.as_str()).unwrap();
//! assert_eq!(TokenService::extract_email(&claims).unwrap(), "u@x.com");
//! ```

pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::HashingParams;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::IdentityToken;
pub use token::TokenService;
