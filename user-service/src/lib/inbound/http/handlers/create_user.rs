use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::authenticate::TokenResponseData;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;
use crate::user::errors::EmailError;

pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .auth_service
        .create_account(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|token| {
            ApiSuccess::new(
                StatusCode::CREATED,
                TokenResponseData {
                    token: token.into_string(),
                },
            )
        })
}

/// HTTP request body for creating an account (raw JSON)
#[derive(Clone, Deserialize)]
pub struct CreateUserRequest {
    email: String,
    password: String,
    #[serde(default, alias = "firstName")]
    first_name: String,
    #[serde(default, alias = "lastName")]
    last_name: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateAccountCommand, EmailError> {
        let email = EmailAddress::new(self.email)?;
        Ok(CreateAccountCommand::new(
            email,
            self.password,
            self.first_name,
            self.last_name,
        ))
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::from(AuthError::from(err))
    }
}
