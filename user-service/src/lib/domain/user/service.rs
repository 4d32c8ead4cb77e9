use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::IdentityToken;
use auth::PasswordHasher;
use auth::TokenService;
use chrono::Utc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::user::events::AuthEvent;
use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::Credentials;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::EventPublisher;
use crate::user::ports::UserRepository;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Authentication gateway.
///
/// Orchestrates the credential store, password hasher, token service and
/// event publisher. Holds no mutable state of its own, so one instance is
/// shared by every in-flight request.
pub struct AuthService<UR, EP>
where
    UR: UserRepository,
    EP: EventPublisher,
{
    repository: Arc<UR>,
    event_publisher: Arc<EP>,
    token_service: Arc<TokenService>,
    password_hasher: PasswordHasher,
    request_timeout: Duration,
}

impl<UR, EP> AuthService<UR, EP>
where
    UR: UserRepository,
    EP: EventPublisher,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `event_publisher` - Auth event publishing implementation
    /// * `token_service` - Token issuance and verification
    pub fn new(
        repository: Arc<UR>,
        event_publisher: Arc<EP>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
            token_service,
            password_hasher: PasswordHasher::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    fn deadline(&self) -> Instant {
        Instant::now() + self.request_timeout
    }

    /// Run `operation` until `deadline`; on expiry its in-flight store calls
    /// are dropped.
    async fn with_deadline<T, F>(
        &self,
        operation: &'static str,
        deadline: Instant,
        future: F,
    ) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match tokio::time::timeout_at(deadline, future).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "Operation exceeded its deadline"
                );
                Err(AuthError::DeadlineExceeded)
            }
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.password_hasher.clone();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(AuthError::from)
    }

    /// Spend the same work a real verification would, so a missing account
    /// answers no faster than a wrong password.
    async fn equalize_timing(&self, password: String) {
        if let Err(e) = self.hash_password(password).await {
            tracing::debug!(error = %e, "Timing equalization hash failed");
        }
    }

    async fn check_credentials(
        &self,
        credentials: Credentials,
    ) -> Result<(EmailAddress, IdentityToken), AuthError> {
        let Credentials { email, password } = credentials;

        let email = match EmailAddress::new(email) {
            Ok(email) => email,
            Err(_) => {
                self.equalize_timing(password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        let user = match self.repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::debug!("Authentication failed: unknown email");
                self.equalize_timing(password).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.verify_password(password, user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Authentication failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.token_service.issue(email.as_str())?;
        tracing::info!(user_id = %user.id, "User authenticated");

        Ok((email, token))
    }

    async fn register(&self, command: CreateAccountCommand) -> Result<IdentityToken, AuthError> {
        // Fast path only; the store's constraint is authoritative.
        if self.repository.exists(&command.email).await? {
            return Err(AuthError::AlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            created_at: Utc::now(),
        };

        let created_user = self.repository.insert(user).await?;
        tracing::info!(user_id = %created_user.id, "Account created");

        Ok(self.token_service.issue(created_user.email.as_str())?)
    }

    /// Best-effort publication within what is left of the request deadline:
    /// failures are logged, never returned.
    async fn publish(&self, event: AuthEvent, deadline: Instant) {
        let outcome =
            tokio::time::timeout_at(deadline, self.event_publisher.publish_auth_event(&event))
                .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(
                event_id = %event.event_id,
                event_type = event.kind.as_str(),
                error = %e,
                "Failed to publish auth event"
            ),
            Err(_) => tracing::error!(
                event_id = %event.event_id,
                event_type = event.kind.as_str(),
                "Timed out publishing auth event"
            ),
        }
    }
}

#[async_trait]
impl<UR, EP> AuthServicePort for AuthService<UR, EP>
where
    UR: UserRepository,
    EP: EventPublisher,
{
    async fn authenticate(&self, credentials: Credentials) -> Result<IdentityToken, AuthError> {
        let deadline = self.deadline();
        let (email, token) = self
            .with_deadline("authenticate", deadline, self.check_credentials(credentials))
            .await?;

        self.publish(AuthEvent::user_authenticated(&email), deadline)
            .await;

        Ok(token)
    }

    async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<IdentityToken, AuthError> {
        let email = command.email.clone();

        let deadline = self.deadline();
        let token = self
            .with_deadline("create_account", deadline, self.register(command))
            .await?;

        self.publish(AuthEvent::account_created(&email), deadline)
            .await;

        Ok(token)
    }

    async fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        self.token_service.verify_email(token).map_err(|e| {
            tracing::debug!(error = %e, "Token validation failed");
            AuthError::from(e)
        })
    }

    async fn resolve_identity(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let email = self.validate_token(token).await?;

        Ok(Identity {
            subject_id: Uuid::new_v4(),
            email,
        })
    }
}
