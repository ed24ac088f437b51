use crate::error::ApiError;
use crate::schemas::RegisterSchema;
use crate::utils::validation::validate_payload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrantName(String);

/// Lowercased, trimmed Gmail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrantEmail(String);

/// Exactly ten ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrantPhone(String);

macro_rules! str_newtype {
    ($($ty:ident),+) => {$(
        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )+};
}

str_newtype!(RegistrantName, RegistrantEmail, RegistrantPhone);

/// A registration that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistrant {
    pub first_name: RegistrantName,
    pub last_name: RegistrantName,
    pub email: RegistrantEmail,
    pub phone: RegistrantPhone,
}

impl NewRegistrant {
    /// Normalize and validate a request body.
    pub fn parse(payload: RegisterSchema) -> Result<Self, ApiError> {
        let payload = payload.normalized();
        validate_payload(&payload)?;

        match payload {
            RegisterSchema {
                first_name: Some(first_name),
                last_name: Some(last_name),
                email: Some(email),
                phone: Some(phone),
            } => Ok(Self {
                first_name: RegistrantName(first_name),
                last_name: RegistrantName(last_name),
                email: RegistrantEmail(email),
                phone: RegistrantPhone(phone),
            }),
            _ => Err(ApiError::MissingField),
        }
    }
}
