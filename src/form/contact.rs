use std::fmt::{Display, Formatter};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::FormModel;
use super::controller::{FormController, FormResult, SubmitOptions};
use super::validation::{FieldErrors, FieldLens, ValidationError};
use crate::schedule::Scheduler;

pub const MESSAGE_MIN_CHARS: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Clone, Debug, Default, Eq, PartialEq, landingkit_form_derive::FormModel)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContactFieldError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
    MessageTooShort { min: usize },
}

impl ValidationError for ContactFieldError {
    fn message(&self) -> String {
        self.to_string()
    }
}

impl Display for ContactFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContactFieldError::NameRequired => f.write_str("Name is required"),
            ContactFieldError::EmailRequired => f.write_str("Email is required"),
            ContactFieldError::EmailInvalid => f.write_str("Please enter a valid email"),
            ContactFieldError::MessageRequired => f.write_str("Message is required"),
            ContactFieldError::MessageTooShort { min } => {
                write!(f, "Message must be at least {min} characters")
            }
        }
    }
}

pub fn check_name(value: &str) -> Result<(), ContactFieldError> {
    if value.trim().is_empty() {
        return Err(ContactFieldError::NameRequired);
    }
    Ok(())
}

/// The format check runs on the raw value, so surrounding spaces fail it.
pub fn check_email(value: &str) -> Result<(), ContactFieldError> {
    if value.trim().is_empty() {
        return Err(ContactFieldError::EmailRequired);
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Err(ContactFieldError::EmailInvalid);
    }
    Ok(())
}

pub fn check_message(value: &str) -> Result<(), ContactFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactFieldError::MessageRequired);
    }
    if trimmed.chars().count() < MESSAGE_MIN_CHARS {
        return Err(ContactFieldError::MessageTooShort {
            min: MESSAGE_MIN_CHARS,
        });
    }
    Ok(())
}

/// Checks every field and returns all failures together.
pub fn validate_contact(form: &ContactForm) -> FieldErrors<ContactFieldError> {
    let fields = ContactForm::fields();
    let checks = [
        (fields.name().key(), check_name(&form.name)),
        (fields.email().key(), check_email(&form.email)),
        (fields.message().key(), check_message(&form.message)),
    ];
    checks
        .into_iter()
        .filter_map(|(key, result)| result.err().map(|error| (key, error)))
        .collect()
}

pub type ContactFormController = FormController<ContactForm, ContactFieldError>;

impl FormController<ContactForm, ContactFieldError> {
    /// An empty contact form with the name/email/message rules registered.
    pub fn contact(options: SubmitOptions, scheduler: Arc<dyn Scheduler>) -> FormResult<Self> {
        let controller = Self::new(ContactForm::default(), options, scheduler);
        controller.register_form_validator(validate_contact)?;
        Ok(controller)
    }
}
