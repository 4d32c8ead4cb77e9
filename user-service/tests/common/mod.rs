use std::sync::Arc;

use async_trait::async_trait;
use auth::HashingParams;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::TokenService;
use tokio::sync::Mutex;
use user_service::domain::user::events::AuthEvent;
use user_service::domain::user::service::AuthService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::user::errors::EventPublisherError;
use user_service::user::ports::EventPublisher;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Publisher that keeps every event it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<AuthEvent>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_auth_event(&self, event: &AuthEvent) -> Result<(), EventPublisherError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
    pub repository: Arc<InMemoryUserRepository>,
    pub publisher: Arc<RecordingPublisher>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let token_service = Arc::new(TokenService::new(JwtHandler::new(TEST_SECRET), 1));

        // Cheap parameters keep the suite fast; production uses the defaults.
        let password_hasher = PasswordHasher::with_params(HashingParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let auth_service = AuthService::new(
            Arc::clone(&repository),
            Arc::clone(&publisher),
            token_service,
        )
        .with_password_hasher(password_hasher);

        let router = create_router(Arc::new(auth_service));

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Server failed to start");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(TEST_SECRET),
            repository,
            publisher,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Create an account and return the HTTP status with the parsed body.
    pub async fn create_user(&self, email: &str, password: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .post("/v1/users")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "first_name": "Test",
                "last_name": "User"
            }))
            .send()
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = response.json().await.expect("Failed to parse response");
        (status, body)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .post("/v1/auth")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = response.json().await.expect("Failed to parse response");
        (status, body)
    }

    pub async fn validate_token(&self, token: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let response = self
            .post("/v1/validate-token")
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = response.json().await.expect("Failed to parse response");
        (status, body)
    }

    /// Sign arbitrary claims with the server's key.
    pub fn sign(&self, claims: &auth::Claims) -> String {
        self.jwt_handler
            .encode(claims)
            .expect("Failed to sign test token")
    }
}
