use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use email_address::Options;
use uuid::Uuid;

use crate::user::errors::EmailError;

/// User aggregate entity.
///
/// Created once by account creation; this service never updates or deletes it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Accepts `local@domain` where the domain's last label is at least two ASCII
/// letters. Stored lowercased so lookups and the uniqueness constraint are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MIN_TLD_LENGTH: usize = 2;

    /// Create a new validated email address.
    ///
    /// Only the bare `local@domain` form is accepted: no display text, no quoted
    /// local part, and local-part characters limited to letters, digits and `._%+-`.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a syntactically valid bare address
    /// * `InvalidTopLevelDomain` - Domain lacks a top-level label of 2+ letters
    pub fn new(email: String) -> Result<Self, EmailError> {
        let parsed = email_address::EmailAddress::parse_with_options(
            &email,
            Options::default().without_display_text(),
        )
        .map_err(|e| EmailError::InvalidFormat(e.to_string()))?;

        if !parsed.local_part().chars().all(Self::is_local_char) {
            return Err(EmailError::InvalidFormat(
                "local part may only contain letters, digits and ._%+-".to_string(),
            ));
        }

        if !parsed
            .domain()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(EmailError::InvalidFormat(
                "domain may only contain letters, digits, dots and hyphens".to_string(),
            ));
        }

        if !Self::has_valid_tld(parsed.domain()) {
            return Err(EmailError::InvalidTopLevelDomain {
                min: Self::MIN_TLD_LENGTH,
            });
        }

        Ok(Self(parsed.email().to_lowercase()))
    }

    fn is_local_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
    }

    fn has_valid_tld(domain: &str) -> bool {
        match domain.rsplit_once('.') {
            Some((rest, tld)) => {
                !rest.is_empty()
                    && tld.len() >= Self::MIN_TLD_LENGTH
                    && tld.chars().all(|c| c.is_ascii_alphabetic())
            }
            None => false,
        }
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Transient email and plaintext password pair; never persisted.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: String, password: String) -> Self {
        Self { email, password }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Command to create a new account with domain types
pub struct CreateAccountCommand {
    pub email: EmailAddress,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl CreateAccountCommand {
    /// Construct a new create account command.
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Plain text password (will be hashed by service)
    /// * `first_name` - Display first name
    /// * `last_name` - Display last name
    pub fn new(email: EmailAddress, password: String, first_name: String, last_name: String) -> Self {
        Self {
            email,
            password,
            first_name,
            last_name,
        }
    }
}

impl fmt::Debug for CreateAccountCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateAccountCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Identity resolved from a bearer token for one request.
///
/// `subject_id` is minted per request and is not tied to any stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: Uuid,
    pub email: String,
}
