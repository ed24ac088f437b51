use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// Validate a payload and collapse the field errors into the single API error
/// callers see, so handlers can `?` it.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| first_violation(&errors))
}

/// Missing fields win over the email rule, which wins over the phone rule.
/// Length limits are checked last so an over-long non-Gmail address still
/// reports the domain rule.
pub fn first_violation(errors: &ValidationErrors) -> ApiError {
    let fields = errors.field_errors();
    let has_code = |code: &str| {
        fields
            .values()
            .flat_map(|errs| errs.iter())
            .any(|e| e.code == code)
    };

    if has_code("required") {
        return ApiError::MissingField;
    }
    if has_code("email_domain") {
        return ApiError::InvalidEmailDomain;
    }
    if has_code("phone_format") {
        return ApiError::InvalidPhone;
    }
    if has_code("length") {
        return ApiError::FieldTooLong;
    }
    ApiError::MalformedPayload
}
