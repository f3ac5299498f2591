use crate::error::{ErrorKind, PaymentError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

#[must_use]
pub(crate) fn error_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::AuthFailure => StatusCode::UNAUTHORIZED,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"success": true, "data": …}` with status 200.
pub(crate) fn ok<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

/// `{"success": true, "message": …}` with status 200.
pub(crate) fn ok_message(message: &str) -> Response {
    Json(json!({ "success": true, "message": message })).into_response()
}

/// Error returned by handlers and extractors.
///
/// Internal and upstream details are logged here and replaced by a fixed
/// message; signature failures always read "Payment verification failed".
#[derive(Debug)]
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = match kind {
            ErrorKind::Internal => {
                error!(error = %self.0, "request failed");
                "Something went wrong, please try again".to_string()
            }
            ErrorKind::Upstream => {
                error!(error = %self.0, "upstream call failed");
                "Could not initiate order.".to_string()
            }
            _ => self.0.to_string(),
        };
        let body = Json(json!({ "success": false, "message": message }));
        (error_status(kind), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::CourseId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(PaymentError::ValidationError("x".into()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(PaymentError::CourseNotFound(CourseId::from("c")))
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(PaymentError::AlreadyEnrolled(CourseId::from("c")))
                .into_response()
                .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(PaymentError::SignatureMismatch)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError(PaymentError::GatewayUnavailable("down".into()))
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
