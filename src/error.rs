use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::{ConflictFields, StoreError};
use crate::utils::response::ErrorBody;

/// Every failure the API reports to callers.
///
/// `Display` is the public `error` string of the response body; store details
/// stay in the source chain and only reach the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("All fields are required")]
    MissingField,

    #[error("Only Gmail addresses are allowed")]
    InvalidEmailDomain,

    #[error("INVALID_PHONE")]
    InvalidPhone,

    #[error("EMAIL_EXISTS")]
    EmailExists,

    #[error("PHONE_EXISTS")]
    PhoneExists,

    // Email takes precedence in the message; `fields` lists both.
    #[error("EMAIL_EXISTS")]
    EmailAndPhoneExist,

    #[error("Field is too long")]
    FieldTooLong,

    #[error("Invalid request body")]
    MalformedPayload,

    #[error("Too many requests")]
    RateLimited,

    #[error("SERVER_ERROR")]
    Server(#[source] StoreError),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingField => "MISSING_FIELD",
            ApiError::InvalidEmailDomain => "INVALID_EMAIL_DOMAIN",
            ApiError::InvalidPhone => "INVALID_PHONE",
            ApiError::EmailExists | ApiError::EmailAndPhoneExist => "EMAIL_EXISTS",
            ApiError::PhoneExists => "PHONE_EXISTS",
            ApiError::FieldTooLong => "FIELD_TOO_LONG",
            ApiError::MalformedPayload => "MALFORMED_PAYLOAD",
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::Server(_) => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField
            | ApiError::InvalidEmailDomain
            | ApiError::InvalidPhone
            | ApiError::FieldTooLong
            | ApiError::MalformedPayload => StatusCode::BAD_REQUEST,
            ApiError::EmailExists | ApiError::PhoneExists | ApiError::EmailAndPhoneExist => {
                StatusCode::CONFLICT
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn conflict(fields: ConflictFields) -> Option<Self> {
        match (fields.email, fields.phone) {
            (true, true) => Some(ApiError::EmailAndPhoneExist),
            (true, false) => Some(ApiError::EmailExists),
            (false, true) => Some(ApiError::PhoneExists),
            (false, false) => None,
        }
    }

    fn conflicting_fields(&self) -> Option<ConflictFields> {
        match self {
            ApiError::EmailExists => Some(ConflictFields::EMAIL),
            ApiError::PhoneExists => Some(ConflictFields::PHONE),
            ApiError::EmailAndPhoneExist => Some(ConflictFields { email: true, phone: true }),
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if let StoreError::Conflict(fields) = &err {
            if let Some(conflict) = ApiError::conflict(*fields) {
                return conflict;
            }
        }
        ApiError::Server(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.code(),
            fields: self.conflicting_fields().map(ConflictFields::names),
        };
        (self.status(), Json(body)).into_response()
    }
}
