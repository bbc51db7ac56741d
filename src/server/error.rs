use crate::errors::{AppError, AuthError, DatabaseError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

/// An `AppError` on its way out as an HTTP response.
///
/// The body is always `{"detail": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Forbidden(_)) => StatusCode::FORBIDDEN,
            AppError::Auth(AuthError::Hashing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(DatabaseError::NotFound(_))
            | AppError::Database(DatabaseError::UnknownMember(_)) => StatusCode::NOT_FOUND,
            AppError::Database(DatabaseError::Duplicate(_)) => StatusCode::CONFLICT,
            AppError::AI(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self.0);
        } else {
            warn!("Request rejected with {}: {}", status, self.0);
        }

        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
