use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that resolves the bearer token into an `Identity` request extension.
///
/// Any failure, including a missing or non-bearer header, ends the request with 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(&req).unwrap_or_default().to_string();

    let identity = state
        .auth_service
        .resolve_identity(&token)
        .await
        .map_err(|e| {
            tracing::warn!(kind = e.kind().as_str(), "Request authentication failed: {}", e);
            ApiError::from(e).into_response()
        })?;

    tracing::debug!(subject_id = %identity.subject_id, "Request authenticated");
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Token from `Authorization: Bearer <token>`, if the header has that shape.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::debug!("Unsupported authorization scheme");
        return None;
    }

    Some(token.trim())
}
