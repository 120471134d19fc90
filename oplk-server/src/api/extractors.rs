//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminToken`, which guards the operator endpoints by comparing
//! the `Authorization: Bearer` header against the configured token in
//! constant time.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use oplk_sdk::objects::ErrorResponse;

use crate::state::AppState;

/// An Axum extractor that admits a request only when it carries the
/// configured admin bearer token.
pub struct AdminToken;

/// Errors returned by the [`AdminToken`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("admin API is not configured")]
    Disabled,
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("malformed Authorization header")]
    MalformedHeader,
    #[error("invalid admin token")]
    InvalidToken,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "admin request rejected");
        let status = match self {
            AdminAuthError::Disabled => StatusCode::NOT_FOUND,
            AdminAuthError::MissingHeader
            | AdminAuthError::MalformedHeader
            | AdminAuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(AdminAuthError::Disabled);
        };

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::MalformedHeader)?;

        let presented = header_value
            .strip_prefix("Bearer ")
            .ok_or(AdminAuthError::MalformedHeader)?;

        ring::constant_time::verify_slices_are_equal(presented.as_bytes(), expected.as_bytes())
            .map_err(|_| AdminAuthError::InvalidToken)?;

        Ok(AdminToken)
    }
}
