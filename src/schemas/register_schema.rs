use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::rules;
use crate::models::registrant::Registrant;

pub const REGISTERED_MESSAGE: &str = "User registered successfully";

// Request schema: every field is optional on the wire so that a missing key is
// reported as MISSING_FIELD instead of a deserialization failure.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSchema {
    #[validate(
        required(message = "First name is required"),
        length(max = 100, message = "First name is too long")
    )]
    pub first_name: Option<String>,

    #[validate(
        required(message = "Last name is required"),
        length(max = 100, message = "Last name is too long")
    )]
    pub last_name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        length(max = 255, message = "Email is too long"),
        custom(function = "validate_gmail")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Phone is required"),
        custom(function = "validate_phone")
    )]
    pub phone: Option<String>,
}

impl RegisterSchema {
    /// Trim every field, lowercase the email and treat blank values as absent.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            email: clean(self.email).map(|e| rules::normalize_email(&e)),
            phone: clean(self.phone),
        }
    }
}

fn validate_gmail(email: &str) -> Result<(), ValidationError> {
    if rules::is_gmail_address(email) {
        return Ok(());
    }
    Err(ValidationError::new("email_domain")
        .with_message(Cow::Borrowed("Only Gmail addresses are allowed")))
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if rules::is_valid_phone(phone) {
        return Ok(());
    }
    Err(ValidationError::new("phone_format")
        .with_message(Cow::Borrowed("Phone number must be exactly 10 digits")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserSchema {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<Registrant> for RegisteredUserSchema {
    fn from(registrant: Registrant) -> Self {
        Self {
            id: registrant.id,
            first_name: registrant.first_name,
            last_name: registrant.last_name,
            email: registrant.email,
            phone: registrant.phone,
        }
    }
}

// Response schema for 201 Created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponseSchema {
    pub message: String,
    pub user: RegisteredUserSchema,
}

impl RegisterResponseSchema {
    pub fn created(registrant: Registrant) -> Self {
        Self {
            message: REGISTERED_MESSAGE.to_string(),
            user: registrant.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_deserialize_as_none() {
        let schema: RegisterSchema =
            serde_json::from_str(r#"{"firstName":"Ann","email":"ann@gmail.com"}"#).unwrap();
        assert_eq!(schema.first_name.as_deref(), Some("Ann"));
        assert!(schema.last_name.is_none());
        assert!(schema.phone.is_none());
    }

    #[test]
    fn normalized_trims_and_drops_blank_fields() {
        let schema = RegisterSchema {
            first_name: Some("  Ann ".into()),
            last_name: Some("   ".into()),
            email: Some(" Ann.Lee@Gmail.com ".into()),
            phone: Some(" 5551234567".into()),
        }
        .normalized();

        assert_eq!(schema.first_name.as_deref(), Some("Ann"));
        assert!(schema.last_name.is_none());
        assert_eq!(schema.email.as_deref(), Some("ann.lee@gmail.com"));
        assert_eq!(schema.phone.as_deref(), Some("5551234567"));
    }

    #[test]
    fn validate_reports_domain_and_phone_fields() {
        let schema = RegisterSchema {
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            email: Some("ann@yahoo.com".into()),
            phone: Some("12345".into()),
        };
        let errors = schema.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("first_name"));
    }

    #[test]
    fn created_response_uses_camel_case() {
        let registrant = Registrant {
            id: 7,
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            email: "ann.lee@gmail.com".into(),
            phone: "5551234567".into(),
            created_at: chrono::Utc::now(),
        };
        let body = serde_json::to_value(RegisterResponseSchema::created(registrant)).unwrap();
        assert_eq!(body["message"], REGISTERED_MESSAGE);
        assert_eq!(body["user"]["firstName"], "Ann");
        assert_eq!(body["user"]["lastName"], "Lee");
        assert_eq!(body["user"]["id"], 7);
        assert!(body["user"].get("createdAt").is_none());
    }
}
