use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::FontgateError;

/// A [`FontgateError`] on its way out as an HTTP response.
///
/// The body is always `{"error": "<message>"}`; caller mistakes get a 400 and
/// everything else a 500.
#[derive(Debug)]
pub struct ApiError(pub FontgateError);

impl ApiError {
    /// The status code the error is reported with
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl<E: Into<FontgateError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self.0);
        } else {
            log::info!("Rejected request: {}", self.0);
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl From<JsonRejection> for FontgateError {
    fn from(rejection: JsonRejection) -> Self {
        FontgateError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for FontgateError {
    fn from(rejection: MultipartRejection) -> Self {
        FontgateError::InvalidRequest(format!("expected a multipart form: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for FontgateError {
    fn from(err: MultipartError) -> Self {
        FontgateError::InvalidRequest(format!("bad multipart body: {}", err.body_text()))
    }
}

impl From<tokio::task::JoinError> for FontgateError {
    fn from(err: tokio::task::JoinError) -> Self {
        FontgateError::General(format!("font processing task failed: {err}"))
    }
}

impl From<reqwest::Error> for FontgateError {
    fn from(err: reqwest::Error) -> Self {
        FontgateError::SourceUnavailable(err.to_string())
    }
}
