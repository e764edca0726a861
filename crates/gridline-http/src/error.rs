//! HTTP error handling
//!
//! Service and export errors are mapped to a status code and a JSON body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use gridline_interchange::ExportError;
use gridline_services::ServiceError;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Service(ServiceError),
    Export(ExportError),
    BadRequest(String),
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Service(inner) => AppError::Service(inner),
            other => AppError::Export(other),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Service(e) => write!(f, "{}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Service(ServiceError::Configuration(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_TABLE")
            }
            AppError::Service(ServiceError::InvalidSortField { .. }) => {
                (StatusCode::BAD_REQUEST, "INVALID_SORT_FIELD")
            }
            AppError::Service(ServiceError::TableNotFound(_)) => {
                (StatusCode::NOT_FOUND, "TABLE_NOT_FOUND")
            }
            AppError::Service(ServiceError::ExportDisabled(_)) => {
                (StatusCode::FORBIDDEN, "EXPORT_DISABLED")
            }
            AppError::Export(ExportError::UnsupportedFormat(_)) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            AppError::Service(ServiceError::Core(_)) | AppError::Export(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, "request rejected");
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridline_core::GridlineError;

    #[test]
    fn test_error_response_serialization() {
        let resp = ErrorResponse::new("TEST_CODE", "Test error message");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("TEST_CODE"));
        assert!(json.contains("Test error message"));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                AppError::from(ServiceError::TableNotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(ServiceError::InvalidSortField { field: "x".into() }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(ExportError::Service(ServiceError::ExportDisabled("csv".into()))),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::from(ExportError::UnsupportedFormat("odt".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(ServiceError::Core(GridlineError::Query("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status_and_code().0, expected, "{}", error);
        }
    }
}
