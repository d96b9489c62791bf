use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::submission::validator::MissingFields;

#[derive(Debug)]
pub enum AppError {
    InvalidInput(MissingFields),
    BadRequest(String),
    MethodNotAllowed,
    Persistence(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidInput(missing) => write!(f, "Invalid Input: {missing}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            AppError::Persistence(msg) => write!(f, "Persistence Failure: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidInput(missing) => (StatusCode::BAD_REQUEST, missing.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            AppError::Persistence(msg) => {
                tracing::error!("Failed to persist submission: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save submission".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<MissingFields> for AppError {
    fn from(missing: MissingFields) -> Self {
        AppError::InvalidInput(missing)
    }
}
