// ============================================================================
// Error Handling - API error responses
// ============================================================================
//
// Every failure a handler can produce funnels through `AppError`, which owns
// the mapping to HTTP status codes and the JSON envelope the frontend reads:
//
//   { "success": false, "error": "<message>" }            (most errors)
//   { "success": false, "errors": { "<field>": [..] } }   (validation)
//
// Internal failures (database, unexpected) are logged server-side with full
// detail. Clients only ever see a generic message for them.
//
// ============================================================================

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Realm advertised on 401 responses
pub const WWW_AUTHENTICATE_VALUE: &str = r#"Bearer realm="api""#;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] JsonRejection),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Flatten validator errors into `{ field: [message, ...] }`
///
/// Fields are sorted so responses are stable across runs.
pub fn field_errors_json(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "success": false,
                    "errors": field_errors_json(&errors),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Json(rejection) => {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                let body = Json(json!({
                    "success": false,
                    "errors": { "non_field_errors": [rejection.body_text()] },
                }));
                let status = match rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                return (status, body).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => {
                let body = Json(json!({
                    "success": false,
                    "error": msg,
                }));
                let mut response = (StatusCode::UNAUTHORIZED, body).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(WWW_AUTHENTICATE_VALUE),
                );
                return response;
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
