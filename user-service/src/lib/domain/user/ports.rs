use async_trait::async_trait;

use crate::domain::user::events::AuthEvent;
use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::User;
use crate::user::errors::AuthError;
use crate::user::errors::EventPublisherError;
use crate::user::errors::UserError;

/// Port for the authentication gateway.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Exchange credentials for an identity token.
    ///
    /// # Returns
    /// Signed identity token for the credential's email
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `Internal` / `DeadlineExceeded` - Store or signing failure
    async fn authenticate(&self, credentials: Credentials) -> Result<auth::IdentityToken, AuthError>;

    /// Create an account and return a token for it.
    ///
    /// # Errors
    /// * `AlreadyExists` - Email is registered (pre-check or store constraint)
    /// * `Internal` / `DeadlineExceeded` - Store, hashing or signing failure
    async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<auth::IdentityToken, AuthError>;

    /// Validate a token and return the email it asserts.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, forged or wrongly shaped token
    /// * `TokenExpired` - Authentic but expired token
    async fn validate_token(&self, token: &str) -> Result<String, AuthError>;

    /// Resolve a bearer token into a per-request identity.
    ///
    /// # Errors
    /// * `MissingToken` - Empty token
    /// * `InvalidToken` / `TokenExpired` - As for `validate_token`
    async fn resolve_identity(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Persistence operations for user credentials.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Probe whether an email is registered.
    ///
    /// Advisory only: the answer may be stale by the time the caller acts on it.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - The store's uniqueness constraint rejected the email
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, user: User) -> Result<User, UserError>;
}

/// Event publishing for auth events.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Publish a login or signup event.
    ///
    /// # Errors
    /// * `SerializationFailed` - Event serialization failed
    /// * `PublishFailed` - Failed to publish to broker
    /// * `QueueFull` / `QueueClosed` - Delivery queue cannot accept the event
    async fn publish_auth_event(&self, event: &AuthEvent) -> Result<(), EventPublisherError>;
}
