mod contact;
mod controller;
mod validation;

#[cfg(test)]
mod tests;

pub use contact::{
    ContactFieldError, ContactForm, ContactFormController, ContactFormEmailLens, ContactFormFields,
    ContactFormMessageLens, ContactFormNameLens, MESSAGE_MIN_CHARS, check_email, check_message,
    check_name, validate_contact,
};
pub use controller::{
    FieldKey, FormController, FormError, FormId, FormResult, FormSnapshot, SubmissionHandle,
    SubmissionTicket, SubmitOptions, SubmitOutcome, SubmitState,
};
pub use landingkit_form_derive::FormModel;
pub use validation::{
    FieldErrors, FieldLens, FieldValidator, FormModel, FormValidator, ValidationError,
    model_from_pairs,
};
