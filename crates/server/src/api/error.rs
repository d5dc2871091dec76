//! Mapping of handler failures onto HTTP responses.
//!
//! SRP: decide status code and public body; details stay in the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bidboard_shape::LimitError;

use super::QueryErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    /// Bad `limit` parameter. 400 with the validator's fixed message.
    InvalidLimit(LimitError),
    /// The row source failed. Already logged by the handler.
    Internal,
}

impl From<LimitError> for ApiError {
    fn from(e: LimitError) -> Self {
        ApiError::InvalidLimit(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidLimit(e) => e.to_string(),
            ApiError::Internal => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = QueryErrorResponse {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_limit_is_400_with_fixed_message() {
        let err = ApiError::from(LimitError::Invalid { raw: "0".into() });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Invalid limit");
    }

    #[test]
    fn internal_hides_details() {
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Internal.public_message(), "Internal Server Error");
    }
}
