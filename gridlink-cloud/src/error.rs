use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced by the cloud's storage and registration operations.
///
/// Each variant maps to one HTTP status; the display string becomes the
/// `detail` field of the JSON error body.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Token issuance was requested for a site that has no configuration.
    #[error("site not found")]
    SiteNotFound,

    /// The token is unknown or was already redeemed.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The edge has no site binding.
    #[error("edge not registered")]
    NotRegistered,

    /// No configuration has ever been written for the site.
    #[error("site not found")]
    ConfigNotFound,

    /// The OS refused to hand out entropy for a fresh token.
    #[error("failed to generate token: {0}")]
    TokenEntropy(#[from] getrandom::Error),
}

impl CloudError {
    fn status(&self) -> StatusCode {
        match self {
            CloudError::InvalidToken => StatusCode::BAD_REQUEST,
            CloudError::TokenEntropy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CloudError::SiteNotFound | CloudError::NotRegistered | CloudError::ConfigNotFound => {
                StatusCode::NOT_FOUND
            }
        }
    }
}

impl IntoResponse for CloudError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
