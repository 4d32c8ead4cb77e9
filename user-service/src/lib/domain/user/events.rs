use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;

/// What the subject of an auth event just did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    UserAuthenticated,
    AccountCreated,
}

impl AuthEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventKind::UserAuthenticated => "user_authenticated",
            AuthEventKind::AccountCreated => "account_created",
        }
    }
}

/// Domain event announcing a successful login or signup.
///
/// Delivery is at-least-once; consumers deduplicate on `event_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub event_id: String,
    pub kind: AuthEventKind,
    pub email: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuthEvent {
    pub fn user_authenticated(email: &EmailAddress) -> Self {
        Self::new(AuthEventKind::UserAuthenticated, email)
    }

    pub fn account_created(email: &EmailAddress) -> Self {
        Self::new(AuthEventKind::AccountCreated, email)
    }

    fn new(kind: AuthEventKind, email: &EmailAddress) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            kind,
            email: email.as_str().to_string(),
            occurred_at: Utc::now(),
        }
    }
}
