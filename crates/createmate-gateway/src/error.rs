use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use createmate_core::CreateMateError;
use tracing::error;

/// A [`CreateMateError`] rendered as `{"detail": ...}` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub CreateMateError);

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match self.0 {
            CreateMateError::Validation(_) | CreateMateError::Json(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CreateMateError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CreateMateError> for ApiError {
    fn from(err: CreateMateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        let detail = match &self.0 {
            CreateMateError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation = ApiError(CreateMateError::Validation("bad".into()));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let timeout = ApiError(CreateMateError::Timeout("slow".into()));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        let bus = ApiError(CreateMateError::Bus("closed".into()));
        assert_eq!(bus.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
