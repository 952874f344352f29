use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shockhook_core::error::{ClientCode, ShockhookError};

/// Handler error. Rendered as a plain-text body with a matching status.
#[derive(Debug)]
pub struct ApiError(pub ShockhookError);

impl From<ShockhookError> for ApiError {
    fn from(e: ShockhookError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest | ClientCode::Validation => StatusCode::BAD_REQUEST,
            ClientCode::AuthFailed => StatusCode::UNAUTHORIZED,
            ClientCode::Forwarding => StatusCode::BAD_GATEWAY,
            ClientCode::Persistence | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}
