use crate::error::ApiError;
use axum::{Json, http::StatusCode};

/// Generic handler result type used across HTTP handlers to simplify signatures.
pub type HandlerResult<T> = Result<(StatusCode, Json<T>), ApiError>;
