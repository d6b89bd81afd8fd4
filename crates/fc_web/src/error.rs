use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Maps core errors onto HTTP statuses with a `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub fc_core::Error);

impl From<fc_core::Error> for ApiError {
    fn from(err: fc_core::Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn bad_request(message: &str) -> Self {
        Self(fc_core::Error::InvalidInput(message.to_string()))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            fc_core::Error::NotFound(_) => StatusCode::NOT_FOUND,
            fc_core::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self.0);
        }
        let message = match &self.0 {
            fc_core::Error::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
