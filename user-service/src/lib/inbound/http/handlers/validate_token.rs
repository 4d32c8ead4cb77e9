use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn validate_token(
    State(state): State<AppState>,
    body: Result<Json<ValidateTokenRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<ValidateTokenResponseData>, ApiError> {
    let Json(body) = body?;

    state
        .auth_service
        .validate_token(&body.token)
        .await
        .map_err(ApiError::from)
        .map(|email| ApiSuccess::new(StatusCode::OK, ValidateTokenResponseData { email }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateTokenRequestBody {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateTokenResponseData {
    pub email: String,
}
