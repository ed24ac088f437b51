//! Join form controller: the client half of the registration workflow.
//!
//! [`JoinForm`] owns the four input fields and the feedback banner, mirrors the
//! server's validation, and talks to the endpoint through a
//! [`RegistrationTransport`]. Phases run
//! `Idle -> Submitting -> Succeeded | Failed`, and a failed local validation
//! goes straight to `Failed` without a request.

use std::time::Duration;

use crate::domain::rules;

pub mod transport;

pub use transport::{
    HttpTransport, RegisterRequest, RegistrationTransport, TransportError, TransportReply,
};

/// How long the success banner stays up before the form resets and closes.
pub const AUTO_CLOSE_DELAY: Duration = Duration::from_secs(3);

pub const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields.";
pub const MSG_GMAIL_ONLY: &str = "Please use a Gmail address.";
pub const MSG_PHONE_FORMAT: &str = "Phone number must be exactly 10 digits.";
pub const MSG_TOO_LONG: &str = "One of the fields is too long.";
pub const MSG_REGISTERED: &str = "Congratulations! Registration complete.";
pub const MSG_EMAIL_IN_USE: &str = "Email already in use.";
pub const MSG_PHONE_IN_USE: &str = "Phone number already in use.";
pub const MSG_INVALID_PHONE: &str = "Invalid phone number.";
pub const MSG_SERVER_ERROR: &str = "Server error. Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl FormFields {
    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: &'static str,
}

impl FormMessage {
    const fn success(text: &'static str) -> Self {
        Self { kind: MessageKind::Success, text }
    }

    const fn warning(text: &'static str) -> Self {
        Self { kind: MessageKind::Warning, text }
    }

    const fn error(text: &'static str) -> Self {
        Self { kind: MessageKind::Error, text }
    }
}

#[derive(Debug, Clone)]
pub struct JoinForm {
    fields: FormFields,
    phase: FormPhase,
    message: Option<FormMessage>,
    open: bool,
}

impl Default for JoinForm {
    fn default() -> Self {
        Self::new()
    }
}

impl JoinForm {
    /// A fresh, open form.
    pub fn new() -> Self {
        Self {
            fields: FormFields::default(),
            phase: FormPhase::Idle,
            message: None,
            open: true,
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn message(&self) -> Option<FormMessage> {
        self.message
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Inputs and the submit control are disabled while a request is in flight.
    pub fn is_input_disabled(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Returns `false` when the edit was ignored because inputs are disabled.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> bool {
        if self.is_input_disabled() {
            return false;
        }
        *self.fields.slot(field) = value.into();
        if self.phase == FormPhase::Failed {
            self.phase = FormPhase::Idle;
        }
        true
    }

    /// Same rules, same order as the endpoint.
    pub fn validate(&self) -> Result<(), FormMessage> {
        let f = &self.fields;
        let blank = [&f.first_name, &f.last_name, &f.email, &f.phone]
            .iter()
            .any(|v| v.trim().is_empty());
        if blank {
            return Err(FormMessage::error(MSG_FILL_ALL_FIELDS));
        }
        if !rules::is_gmail_address(f.email.trim()) {
            return Err(FormMessage::error(MSG_GMAIL_ONLY));
        }
        if !rules::is_valid_phone(f.phone.trim()) {
            return Err(FormMessage::error(MSG_PHONE_FORMAT));
        }
        let too_long = |value: &str, max: usize| value.trim().chars().count() > max;
        if too_long(&f.first_name, rules::MAX_NAME_CHARS)
            || too_long(&f.last_name, rules::MAX_NAME_CHARS)
            || too_long(&f.email, rules::MAX_EMAIL_CHARS)
        {
            return Err(FormMessage::error(MSG_TOO_LONG));
        }
        Ok(())
    }

    /// Validate and enter `Submitting`. Returns the request to send, or `None`
    /// when nothing should be sent (invalid input or a request already in flight).
    pub fn begin_submit(&mut self) -> Option<RegisterRequest> {
        if self.is_input_disabled() {
            return None;
        }
        if let Err(message) = self.validate() {
            self.message = Some(message);
            self.phase = FormPhase::Failed;
            return None;
        }

        self.message = None;
        self.phase = FormPhase::Submitting;
        Some(RegisterRequest {
            first_name: self.fields.first_name.clone(),
            last_name: self.fields.last_name.clone(),
            email: self.fields.email.clone(),
            phone: self.fields.phone.clone(),
        })
    }

    /// Render the outcome of the request started by [`begin_submit`](Self::begin_submit).
    pub fn complete_submit(&mut self, outcome: Result<TransportReply, TransportError>) {
        let (phase, message) = match outcome {
            Ok(reply) if reply.is_success() => {
                (FormPhase::Succeeded, FormMessage::success(MSG_REGISTERED))
            }
            Ok(reply) => (FormPhase::Failed, message_for_error(reply.error.as_deref())),
            Err(e) => {
                tracing::warn!(error = %e, "registration request failed");
                (FormPhase::Failed, FormMessage::error(MSG_SERVER_ERROR))
            }
        };
        self.phase = phase;
        self.message = Some(message);
    }

    /// One attempt, no retry.
    pub async fn submit<T>(&mut self, transport: &T) -> FormPhase
    where
        T: RegistrationTransport + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return self.phase;
        };
        let outcome = transport.register(&request).await;
        self.complete_submit(outcome);
        self.phase
    }

    /// After a success, wait [`AUTO_CLOSE_DELAY`] then reset and close.
    /// Does nothing if the last submission did not succeed.
    pub async fn close_after_success(&mut self) {
        if self.phase != FormPhase::Succeeded {
            return;
        }
        tokio::time::sleep(AUTO_CLOSE_DELAY).await;
        self.close();
    }

    pub fn reset(&mut self) {
        self.fields = FormFields::default();
        self.message = None;
        self.phase = FormPhase::Idle;
    }

    pub fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    pub fn open(&mut self) {
        self.open = true;
    }
}

fn message_for_error(code: Option<&str>) -> FormMessage {
    match code {
        Some("EMAIL_EXISTS") => FormMessage::warning(MSG_EMAIL_IN_USE),
        Some("PHONE_EXISTS") => FormMessage::warning(MSG_PHONE_IN_USE),
        Some("INVALID_PHONE") => FormMessage::warning(MSG_INVALID_PHONE),
        Some("FIELD_TOO_LONG") => FormMessage::warning(MSG_TOO_LONG),
        _ => FormMessage::error(MSG_SERVER_ERROR),
    }
}
