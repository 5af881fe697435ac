//! HTTP error handling and response types.

use axum::{
    extract::rejection::{
        BytesRejection, JsonRejection, PathRejection, QueryRejection, StringRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use class_status::StatusError;
use serde::{Deserialize, Serialize};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Missing or unknown bearer token
    Unauthorized,
    /// Request could not be understood
    BadRequest(String),
    /// Request was well-formed but a field failed validation
    InvalidInput(String),
    /// Request body over the configured limit
    PayloadTooLarge(String),
    /// No image extractor is configured
    ExtractorUnavailable,
    /// Unexpected server-side failure
    Internal(String),
    /// Domain failure
    Status(StatusError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::ExtractorUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "EXTRACTION_UNAVAILABLE")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::Status(e) => match e {
                StatusError::InvalidTime(_)
                | StatusError::InvalidDay(_)
                | StatusError::InvalidRow { .. }
                | StatusError::InvalidLocation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                StatusError::UsernameTaken(_)
                | StatusError::EmailTaken(_)
                | StatusError::SelfRequest
                | StatusError::AlreadyFriends(_)
                | StatusError::DuplicateRequest(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
                StatusError::ReceiverInClass(_) => (StatusCode::BAD_REQUEST, "IN_CLASS"),
                StatusError::UserNotFound(_)
                | StatusError::BlockNotFound(_)
                | StatusError::RequestNotFound(_)
                | StatusError::NotificationNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                StatusError::NotFriends(_) => (StatusCode::FORBIDDEN, "NOT_FRIENDS"),
                StatusError::Extraction(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
                }
                StatusError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Unauthorized => "Missing or invalid bearer token".to_string(),
            AppError::BadRequest(msg)
            | AppError::InvalidInput(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::ExtractorUnavailable => {
                "Schedule image extraction is not configured".to_string()
            }
            AppError::Status(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %self.message(), "request failed");
        }
        (status, Json(ApiError::new(code, self.message()))).into_response()
    }
}

impl From<StatusError> for AppError {
    fn from(err: StatusError) -> Self {
        AppError::Status(err)
    }
}

/// Body, query or path that could not be read at all.
fn rejected(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::InvalidInput(e.body_text()),
            other => rejected(other.status(), other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(e) => {
                AppError::InvalidInput(e.body_text())
            }
            other => AppError::Internal(other.body_text()),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<StringRejection> for AppError {
    fn from(rejection: StringRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_codes() {
        use StatusCode as S;
        let cases = [
            (StatusError::InvalidTime("9:00".into()), S::BAD_REQUEST, "INVALID_INPUT"),
            (StatusError::SelfRequest, S::BAD_REQUEST, "CONFLICT"),
            (StatusError::NotFriends(2), S::FORBIDDEN, "NOT_FRIENDS"),
            (StatusError::Store("down".into()), S::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        ];
        for (err, status, code) in cases {
            assert_eq!(AppError::from(err).parts(), (status, code));
        }
    }

    #[test]
    fn missing_extractor_is_unavailable() {
        let err = AppError::ExtractorUnavailable;
        assert_eq!(
            err.parts(),
            (StatusCode::SERVICE_UNAVAILABLE, "EXTRACTION_UNAVAILABLE")
        );
        assert!(err.message().contains("not configured"));
    }
}
