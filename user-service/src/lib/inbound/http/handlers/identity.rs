use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::user::models::Identity;

/// Echo the identity the auth middleware resolved for this request.
pub async fn identity(Extension(identity): Extension<Identity>) -> ApiSuccess<IdentityResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        IdentityResponseData {
            subject_id: identity.subject_id.to_string(),
            email: identity.email,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityResponseData {
    pub subject_id: String,
    pub email: String,
}
