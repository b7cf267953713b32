//! API errors and the error detail handed to the recording middleware.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::WindowError;

/// Attached to a response so the request middleware can record what went
/// wrong instead of a bare status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub error_type: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid window: {0}")]
    InvalidWindow(#[from] WindowError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidWindow(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ApiError::InvalidWindow(_) => "InvalidWindow",
            ApiError::InvalidQuery(_) => "InvalidQuery",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let detail = ErrorDetail {
            error_type: self.type_name().to_string(),
            message: message.clone(),
        };

        let body = if status.is_server_error() {
            json!({ "error": "Internal server error" })
        } else {
            json!({ "error": message })
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(detail);
        response
    }
}

/// Turns a handler panic into a 500 that still carries what happened.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response();
    response.extensions_mut().insert(ErrorDetail {
        error_type: "Panic".to_string(),
        message,
    });
    response
}
