use super::*;
use crate::feedback::{Notification, Severity};
use crate::schedule::ManualScheduler;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Transitions = Arc<Mutex<Vec<(SubmitState, SubmitState)>>>;
type Notifications = Arc<Mutex<Vec<Notification>>>;

struct Harness {
    scheduler: Arc<ManualScheduler>,
    controller: ContactFormController,
    transitions: Transitions,
    notifications: Notifications,
}

fn harness() -> Harness {
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = ContactFormController::contact(SubmitOptions::default(), scheduler.clone())
        .expect("contact controller");

    let transitions = Transitions::default();
    {
        let transitions = transitions.clone();
        controller
            .on_transition(move |from, to| {
                transitions
                    .lock()
                    .expect("transitions lock")
                    .push((from, to))
            })
            .expect("register listener");
    }

    let notifications = Notifications::default();
    {
        let notifications = notifications.clone();
        controller
            .set_notifier(Arc::new(move |notification: Notification| {
                notifications
                    .lock()
                    .expect("notifications lock")
                    .push(notification)
            }))
            .expect("set notifier");
    }

    Harness {
        scheduler,
        controller,
        transitions,
        notifications,
    }
}

fn fill_valid(controller: &ContactFormController) {
    let fields = ContactForm::fields();
    controller
        .set(fields.name(), "Ada".to_string())
        .expect("set name");
    controller
        .set(fields.email(), "ada@example.com".to_string())
        .expect("set email");
    controller
        .set(fields.message(), "Tell me about the engine".to_string())
        .expect("set message");
}

fn messages(errors: &FieldErrors<ContactFieldError>) -> Vec<(&'static str, String)> {
    errors
        .iter()
        .map(|(key, error)| (key.as_str(), error.message()))
        .collect()
}

#[test]
fn empty_form_reports_every_field() {
    let errors = validate_contact(&ContactForm::default());
    assert_eq!(
        messages(&errors),
        vec![
            ("email", "Email is required".to_string()),
            ("message", "Message is required".to_string()),
            ("name", "Name is required".to_string()),
        ]
    );
}

#[test]
fn blank_name_is_the_only_error() {
    let errors = validate_contact(&ContactForm::new("  ", "a@b.com", "1234567890"));
    assert_eq!(
        messages(&errors),
        vec![("name", "Name is required".to_string())]
    );
}

#[test]
fn malformed_email_uses_format_message() {
    let errors = validate_contact(&ContactForm::new("A", "not-an-email", "1234567890"));
    assert_eq!(
        messages(&errors),
        vec![("email", "Please enter a valid email".to_string())]
    );
}

#[test]
fn short_message_uses_length_message() {
    let errors = validate_contact(&ContactForm::new("A", "a@b.com", "short"));
    assert_eq!(
        messages(&errors),
        vec![(
            "message",
            "Message must be at least 10 characters".to_string()
        )]
    );
}

#[test]
fn complete_form_is_valid() {
    assert!(validate_contact(&ContactForm::new("A", "a@b.com", "1234567890")).is_empty());
}

#[test]
fn email_format_is_checked_on_the_raw_value() {
    assert_eq!(check_email(" a@b.com"), Err(ContactFieldError::EmailInvalid));
    assert_eq!(check_email("a@b"), Err(ContactFieldError::EmailInvalid));
    assert_eq!(check_email("a@@b.com"), Err(ContactFieldError::EmailInvalid));
    assert_eq!(check_email("   "), Err(ContactFieldError::EmailRequired));
    assert_eq!(check_email("first.last@mail.example.org"), Ok(()));
}

#[test]
fn message_length_ignores_surrounding_whitespace() {
    assert_eq!(
        check_message("   123456789   "),
        Err(ContactFieldError::MessageTooShort { min: 10 })
    );
    assert_eq!(check_message("  1234567890  "), Ok(()));
    assert_eq!(check_message("éééééééééé"), Ok(()));
}

#[test]
fn validation_is_idempotent_and_keys_stay_within_the_model() {
    let inputs = [
        ContactForm::default(),
        ContactForm::new("A", "x", ""),
        ContactForm::new(" ", "a@b.c", "hello"),
        ContactForm::new("Bo", "bo@site.io", "long enough message"),
    ];
    for input in inputs {
        let first = validate_contact(&input);
        let second = validate_contact(&input);
        assert_eq!(first, second);
        assert!(
            first
                .keys()
                .all(|key| ContactForm::field_keys().contains(key))
        );
    }
}

#[test]
fn model_from_pairs_fills_known_fields() {
    let form: ContactForm = model_from_pairs([("name", "A"), ("email", "a@b.com")])
        .expect("known fields");
    assert_eq!(form, ContactForm::new("A", "a@b.com", ""));

    let unknown = model_from_pairs::<ContactForm, _, _, _>([("phone", "123")]);
    assert_eq!(unknown, Err(FormError::UnknownField("phone".to_string())));
}

#[test]
fn derive_exposes_keys_and_text_access() {
    let fields = ContactForm::fields();
    assert_eq!(fields.email().key().as_str(), "email");
    assert_eq!(
        ContactForm::field_keys()
            .iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>(),
        vec!["name", "email", "message"]
    );

    let mut form = ContactForm::new("A", "b", "c");
    assert_eq!(form.text(fields.email().key()), Some("b"));
    if let Some(slot) = form.text_mut(fields.message().key()) {
        slot.push('!');
    }
    assert_eq!(form.message, "c!");
    assert_eq!(form.text(FieldKey::new("phone")), None);
}

#[test]
fn editing_a_field_clears_only_its_error() {
    let Harness { controller, .. } = harness();
    let fields = ContactForm::fields();

    assert!(matches!(
        controller.submit().expect("submit"),
        SubmitOutcome::Rejected
    ));
    assert_eq!(controller.snapshot().expect("snapshot").errors.len(), 3);

    controller
        .set(fields.email(), "still wrong".to_string())
        .expect("set email");
    let snapshot = controller.snapshot().expect("snapshot");
    assert!(snapshot.error(fields.email().key()).is_none());
    assert_eq!(
        snapshot.error(fields.name().key()),
        Some(&ContactFieldError::NameRequired)
    );
    assert_eq!(
        snapshot.error(fields.message().key()),
        Some(&ContactFieldError::MessageRequired)
    );
}

#[test]
fn set_field_addresses_fields_by_name() {
    let Harness { controller, .. } = harness();

    controller.set_field("name", "Grace").expect("set name");
    assert_eq!(controller.snapshot().expect("snapshot").model.name, "Grace");

    assert_eq!(
        controller.set_field("phone", "555"),
        Err(FormError::UnknownField("phone".to_string()))
    );
}

#[test]
fn valid_submit_is_acknowledged_after_the_delay() {
    let Harness {
        scheduler,
        controller,
        transitions,
        notifications,
    } = harness();
    fill_valid(&controller);

    let outcome = controller.submit().expect("submit");
    let handle = outcome.handle().expect("scheduled").clone();
    assert!(handle.is_pending());
    assert_eq!(
        controller.snapshot().expect("snapshot").submit_state,
        SubmitState::Submitting
    );

    scheduler.advance(Duration::from_millis(1_999));
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Submitting);
    assert_eq!(snapshot.model.name, "Ada");
    assert!(notifications.lock().expect("notifications lock").is_empty());

    scheduler.advance(Duration::from_millis(1));
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert_eq!(snapshot.model, ContactForm::default());
    assert_eq!(snapshot.submit_count, 1);
    assert!(!handle.is_pending());

    assert_eq!(
        *transitions.lock().expect("transitions lock"),
        vec![
            (SubmitState::Idle, SubmitState::Submitting),
            (SubmitState::Submitting, SubmitState::Succeeded),
            (SubmitState::Succeeded, SubmitState::Idle),
        ]
    );
    let notifications = notifications.lock().expect("notifications lock");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].severity, Severity::Success);
    assert_eq!(notifications[0].summary, "Success");
    assert_eq!(
        notifications[0].detail,
        "Your message has been sent successfully!"
    );
    assert_eq!(notifications[0].life_ms, Some(3_000));
}

#[test]
fn invalid_submit_never_schedules() {
    let Harness {
        scheduler,
        controller,
        transitions,
        ..
    } = harness();
    controller.set_field("name", "A").expect("set name");
    controller.set_field("email", "nope").expect("set email");

    assert!(matches!(
        controller.submit().expect("submit"),
        SubmitOutcome::Rejected
    ));
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert!(!snapshot.is_valid);
    assert_eq!(snapshot.submit_count, 0);
    assert_eq!(scheduler.pending(), 0);
    assert!(transitions.lock().expect("transitions lock").is_empty());
}

#[test]
fn second_submit_while_in_flight_is_ignored() {
    let Harness {
        scheduler,
        controller,
        notifications,
        ..
    } = harness();
    fill_valid(&controller);

    assert!(controller.submit().expect("first submit").handle().is_some());
    assert!(matches!(
        controller.submit().expect("second submit"),
        SubmitOutcome::Ignored
    ));
    assert_eq!(scheduler.pending(), 1);

    scheduler.run_until_idle(10);
    assert_eq!(notifications.lock().expect("notifications lock").len(), 1);
}

#[test]
fn dropping_the_controller_cancels_the_acknowledgment() {
    let Harness {
        scheduler,
        controller,
        notifications,
        ..
    } = harness();
    fill_valid(&controller);

    let outcome = controller.submit().expect("submit");
    let handle = outcome.handle().expect("scheduled").clone();
    drop(controller);

    assert!(!handle.is_pending());
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(Duration::from_secs(5));
    assert!(notifications.lock().expect("notifications lock").is_empty());
    assert!(!handle.cancel());
}

#[test]
fn cancelled_submission_returns_to_idle() {
    let Harness {
        scheduler,
        controller,
        transitions,
        notifications,
    } = harness();
    fill_valid(&controller);

    let outcome = controller.submit().expect("submit");
    let handle = outcome.handle().expect("scheduled");
    assert!(handle.cancel());
    assert!(!handle.cancel());

    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert_eq!(snapshot.model.name, "Ada");
    assert_eq!(
        transitions.lock().expect("transitions lock").last(),
        Some(&(SubmitState::Submitting, SubmitState::Idle))
    );

    scheduler.advance(Duration::from_secs(5));
    assert!(notifications.lock().expect("notifications lock").is_empty());

    let retry = controller.submit().expect("retry");
    assert!(retry.handle().is_some());
    assert!(controller.cancel_submission().expect("cancel"));
    assert!(!controller.cancel_submission().expect("nothing to cancel"));
}

#[test]
fn submit_observes_the_latest_edit() {
    let Harness {
        scheduler,
        controller,
        ..
    } = harness();
    fill_valid(&controller);
    controller.set_field("email", "first@example.com").expect("edit");
    controller.set_field("email", "broken").expect("edit again");

    assert!(matches!(
        controller.submit().expect("submit"),
        SubmitOutcome::Rejected
    ));
    assert_eq!(
        controller
            .error_message(ContactForm::fields().email())
            .expect("error message"),
        Some("Please enter a valid email".to_string())
    );
    assert_eq!(scheduler.pending(), 0);
}

#[test]
fn validate_stores_errors_without_submitting() {
    let Harness {
        scheduler,
        controller,
        ..
    } = harness();

    assert!(!controller.validate().expect("validate"));
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.errors.len(), 3);
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert_eq!(scheduler.pending(), 0);

    fill_valid(&controller);
    assert!(controller.validate().expect("validate"));
    controller.reset_to_initial().expect("reset");
    assert_eq!(
        controller.snapshot().expect("snapshot").model,
        ContactForm::default()
    );
}

#[test]
fn field_validators_take_precedence_and_foreign_keys_are_dropped() {
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = FormController::<ContactForm, ContactFieldError>::new(
        ContactForm::new("root", "root@example.com", "1234567890"),
        SubmitOptions::default().acknowledge_after(Duration::from_millis(10)),
        scheduler.clone(),
    );
    let fields = ContactForm::fields();
    controller
        .register_field_validator(fields.name(), |_model: &ContactForm, value: &String| {
            if value == "root" {
                Err(ContactFieldError::NameRequired)
            } else {
                Ok(())
            }
        })
        .expect("register field validator");
    controller
        .register_form_validator(|_model: &ContactForm| {
            let mut errors = FieldErrors::new();
            errors.insert(FieldKey::new("name"), ContactFieldError::EmailInvalid);
            errors.insert(FieldKey::new("phone"), ContactFieldError::EmailInvalid);
            errors
        })
        .expect("register form validator");

    assert!(!controller.validate().expect("validate"));
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.errors.len(), 1);
    assert_eq!(
        snapshot.error(fields.name().key()),
        Some(&ContactFieldError::NameRequired)
    );
}

#[test]
fn custom_options_drive_the_acknowledgment() {
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = ContactFormController::contact(
        SubmitOptions::new()
            .acknowledge_after(Duration::from_millis(50))
            .notification_life_ms(1_000)
            .success_summary("Sent")
            .success_detail("Thanks!"),
        scheduler.clone(),
    )
    .expect("contact controller");
    let seen = Notifications::default();
    {
        let seen = seen.clone();
        controller
            .set_notifier(Arc::new(move |notification: Notification| {
                seen.lock().expect("seen lock").push(notification)
            }))
            .expect("set notifier");
    }
    fill_valid(&controller);
    controller.submit().expect("submit");

    scheduler.advance(Duration::from_millis(50));
    let seen = seen.lock().expect("seen lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].summary, "Sent");
    assert_eq!(seen[0].detail, "Thanks!");
    assert_eq!(seen[0].life_ms, Some(1_000));
}
