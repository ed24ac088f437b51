//! Field rules shared by the registration endpoint and the join form.

/// Only Gmail addresses may join the waitlist.
pub const REQUIRED_EMAIL_DOMAIN: &str = "@gmail.com";

/// Phone numbers are stored as exactly this many ASCII digits.
pub const PHONE_DIGITS: usize = 10;

/// Longest first or last name accepted, in characters (`VARCHAR(100)`).
pub const MAX_NAME_CHARS: usize = 100;

/// Longest email accepted, in characters (`VARCHAR(255)`).
pub const MAX_EMAIL_CHARS: usize = 255;

/// Trim surrounding whitespace and lowercase, the form emails are compared and stored in.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive substring check, so `Ann@GMAIL.com` passes.
pub fn is_gmail_address(email: &str) -> bool {
    email.to_lowercase().contains(REQUIRED_EMAIL_DOMAIN)
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}
