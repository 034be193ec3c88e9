use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use nh_core::Error;

/// Route-level error: an `nh_core::Error` rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Validation(_) | Error::Duplicate(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        json_error(status, self.0.to_string())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::Unauthorized("Invalid token".into()), StatusCode::UNAUTHORIZED),
            (Error::Validation("Article ID is required".into()), StatusCode::BAD_REQUEST),
            (Error::Duplicate("Article already saved".into()), StatusCode::BAD_REQUEST),
            (Error::NotFound("Article not found".into()), StatusCode::NOT_FOUND),
            (Error::Storage("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Config("missing".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError(error).status(), status);
        }
    }
}
