use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{parser, pipeline};

pub async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let is_multipart = content_type
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("multipart/form-data"));

    let fields = if is_multipart {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    }
    .map_err(|e| AppError::BadRequest(format!("Invalid body: {e}")))?;

    let outcome = pipeline::run(&state.dispatcher, fields).await?;

    Ok(Json(json!({
        "success": true,
        "message": outcome.message(),
    })))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
