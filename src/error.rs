//! Typed errors, HTTP status mapping, and the JSON error envelope.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Errors raised by handlers, seeding, and the store. Conflicts surface as
/// 400 alongside the rest of the bad-input family, not 409.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Fixture(String),
    #[error("database error occurred")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::Db(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Fixture(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "invalid_input",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) | AppError::Db(sqlx::Error::RowNotFound) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation_error",
            AppError::Fixture(_) => "data_format_error",
            AppError::Db(_) => "database_error",
            AppError::Unavailable(_) => "service_unavailable",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Db(sqlx::Error::RowNotFound) => "record not found".to_string(),
            other => other.to_string(),
        }
    }
}

/// Carried through response extensions so the envelope middleware can add the
/// request context (path, method) that `IntoResponse` cannot see.
#[derive(Clone)]
pub struct ErrorParts {
    pub detail: String,
    pub error_type: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        let parts = ErrorParts {
            detail: self.detail(),
            error_type: self.error_type(),
        };
        let mut response = status.into_response();
        response.extensions_mut().insert(parts);
        response
    }
}

/// Uniform error shape: `{detail, status_code, timestamp, path, method, error_type}`.
#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub method: String,
    pub error_type: String,
}

/// Status-derived classification for errors produced outside [`AppError`]
/// (extractor rejections, unmatched routes).
fn fallback_error_type(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "invalid_input",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::METHOD_NOT_ALLOWED => "method_not_allowed",
        StatusCode::UNPROCESSABLE_ENTITY => "validation_error",
        StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
        status if status.is_server_error() => "internal_error",
        _ => "error",
    }
}

const REJECTION_BODY_LIMIT: usize = 64 * 1024;

/// Middleware that shapes every 4xx/5xx response into the uniform envelope.
/// Responses from [`AppError`] carry [`ErrorParts`] in their extensions;
/// anything else (e.g. a `Json` rejection) contributes its plain-text body as
/// the detail message.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let (detail, error_type) = match parts.extensions.remove::<ErrorParts>() {
        Some(err) => (err.detail, err.error_type),
        None => {
            let bytes = axum::body::to_bytes(body, REJECTION_BODY_LIMIT)
                .await
                .unwrap_or_default();
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let detail = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text
            };
            (detail, fallback_error_type(status))
        }
    };

    let envelope = ErrorBody {
        detail,
        status_code: status.as_u16(),
        timestamp: Utc::now().to_rfc3339(),
        path,
        method,
        error_type: error_type.to_string(),
    };
    (status, Json(envelope)).into_response()
}
