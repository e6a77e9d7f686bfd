use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use super::validation::{FieldErrors, FieldLens, FormModel, ValidationError};
use crate::feedback::{Notification, Notifier, Severity};
use crate::schedule::{Scheduler, TaskHandle};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubmissionTicket(pub u64);

/// `Idle -> Submitting -> Succeeded -> Idle`, with `Submitting -> Idle` when a
/// pending submission is cancelled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubmitOptions {
    pub acknowledge_after: Duration,
    pub notification_life_ms: u32,
    pub success_summary: String,
    pub success_detail: String,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            acknowledge_after: Duration::from_millis(2_000),
            notification_life_ms: 3_000,
            success_summary: "Success".to_string(),
            success_detail: "Your message has been sent successfully!".to_string(),
        }
    }
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acknowledge_after(mut self, value: Duration) -> Self {
        self.acknowledge_after = value;
        self
    }

    pub fn notification_life_ms(mut self, value: u32) -> Self {
        self.notification_life_ms = value;
        self
    }

    pub fn success_summary(mut self, value: impl Into<String>) -> Self {
        self.success_summary = value.into();
        self
    }

    pub fn success_detail(mut self, value: impl Into<String>) -> Self {
        self.success_detail = value.into();
        self
    }
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T, E> {
    pub model: T,
    pub errors: FieldErrors<E>,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_valid: bool,
}

impl<T, E> FormSnapshot<T, E> {
    pub fn error(&self, key: FieldKey) -> Option<&E> {
        self.errors.get(&key)
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_state == SubmitState::Submitting
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("unknown form field `{0}`")]
    UnknownField(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// What a call to [`FormController::submit`] did.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; errors were stored and nothing was scheduled.
    Rejected,
    /// A submission is already in flight.
    Ignored,
    Scheduled(SubmissionHandle),
}

impl SubmitOutcome {
    pub fn handle(&self) -> Option<&SubmissionHandle> {
        match self {
            SubmitOutcome::Scheduled(handle) => Some(handle),
            _ => None,
        }
    }
}

type Canceller = Arc<dyn Fn(SubmissionTicket) -> bool + Send + Sync>;

/// Cancellation handle for one scheduled acknowledgment.
#[derive(Clone)]
pub struct SubmissionHandle {
    ticket: SubmissionTicket,
    task: TaskHandle,
    canceller: Canceller,
}

impl SubmissionHandle {
    pub fn ticket(&self) -> SubmissionTicket {
        self.ticket
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_pending()
    }

    /// Cancels the acknowledgment and returns the controller to `Idle`.
    pub fn cancel(&self) -> bool {
        (self.canceller)(self.ticket) || self.task.cancel()
    }
}

impl std::fmt::Debug for SubmissionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionHandle")
            .field("ticket", &self.ticket)
            .field("task", &self.task)
            .finish()
    }
}

pub(super) type SyncFieldValidatorFn<T, E> = Arc<dyn Fn(&T) -> Result<(), E> + Send + Sync>;
pub(super) type SyncFormValidatorFn<T, E> = Arc<dyn Fn(&T) -> FieldErrors<E> + Send + Sync>;
type TransitionListener = Arc<dyn Fn(SubmitState, SubmitState) + Send + Sync>;

pub(super) struct FormState<T, E> {
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) errors: FieldErrors<E>,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) last_ticket: u64,
    pub(super) pending: Option<(SubmissionTicket, TaskHandle)>,
}

pub(super) struct Shared<T, E> {
    pub(super) id: FormId,
    pub(super) options: SubmitOptions,
    pub(super) state: RwLock<FormState<T, E>>,
    pub(super) field_validators: RwLock<Vec<(FieldKey, SyncFieldValidatorFn<T, E>)>>,
    pub(super) form_validators: RwLock<Vec<SyncFormValidatorFn<T, E>>>,
    pub(super) listeners: RwLock<Vec<TransitionListener>>,
    pub(super) notifier: RwLock<Option<Arc<dyn Notifier>>>,
}

/// Owns a form model, its errors and the submission state machine.
///
/// The acknowledgment callback only holds a weak reference to the controller
/// state, and dropping the controller cancels it, so a disposed form is never
/// written to.
pub struct FormController<T, E>
where
    T: FormModel,
    E: ValidationError,
{
    pub(super) shared: Arc<Shared<T, E>>,
    scheduler: Arc<dyn Scheduler>,
}

impl<T, E> FormController<T, E>
where
    T: FormModel,
    E: ValidationError,
{
    pub fn new(initial: T, options: SubmitOptions, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: FormId::next(),
                options,
                state: RwLock::new(FormState {
                    initial_model: initial.clone(),
                    model: initial,
                    errors: FieldErrors::new(),
                    submit_state: SubmitState::Idle,
                    submit_count: 0,
                    last_ticket: 0,
                    pending: None,
                }),
                field_validators: RwLock::new(Vec::new()),
                form_validators: RwLock::new(Vec::new()),
                listeners: RwLock::new(Vec::new()),
                notifier: RwLock::new(None),
            }),
            scheduler,
        }
    }

    pub fn form_id(&self) -> FormId {
        self.shared.id
    }

    pub fn options(&self) -> &SubmitOptions {
        &self.shared.options
    }

    pub fn set_notifier(&self, notifier: Arc<dyn Notifier>) -> FormResult<()> {
        *write_lock(&self.shared.notifier, "setting notifier")? = Some(notifier);
        Ok(())
    }

    pub fn on_transition(
        &self,
        listener: impl Fn(SubmitState, SubmitState) + Send + Sync + 'static,
    ) -> FormResult<()> {
        let mut listeners = write_lock(&self.shared.listeners, "registering transition listener")?;
        listeners.push(Arc::new(listener));
        Ok(())
    }

    /// Overwrites one field. A stored error for that field is cleared; other
    /// fields' errors are left alone and nothing is revalidated.
    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.shared.state, "writing form model")?;
        lens.set(&mut state.model, value);
        state.errors.remove(&key);
        Ok(())
    }

    /// [`FormController::set`] addressed by field name.
    pub fn set_field(&self, name: &str, value: impl Into<String>) -> FormResult<()> {
        let key = T::field_key(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        let mut state = write_lock(&self.shared.state, "writing form field by name")?;
        match state.model.text_mut(key) {
            Some(slot) => *slot = value.into(),
            None => return Err(FormError::UnknownField(name.to_string())),
        }
        state.errors.remove(&key);
        Ok(())
    }

    /// Validates the current model and stores the result without submitting.
    pub fn validate(&self) -> FormResult<bool> {
        let model = read_lock(&self.shared.state, "reading model for validation")?
            .model
            .clone();
        let errors = self.run_validators(&model)?;
        let is_valid = errors.is_empty();
        write_lock(&self.shared.state, "storing validation result")?.errors = errors;
        Ok(is_valid)
    }

    pub fn submit(&self) -> FormResult<SubmitOutcome> {
        let id = self.shared.id.0;
        let model = {
            let state = read_lock(&self.shared.state, "preparing submit")?;
            if state.submit_state != SubmitState::Idle {
                debug!("form: submit ignored id={id} state={:?}", state.submit_state);
                return Ok(SubmitOutcome::Ignored);
            }
            state.model.clone()
        };
        let errors = self.run_validators(&model)?;

        let (transition, ticket, task) = {
            let mut state = write_lock(&self.shared.state, "applying submit validation")?;
            if state.submit_state != SubmitState::Idle {
                return Ok(SubmitOutcome::Ignored);
            }
            if !errors.is_empty() {
                debug!("form: submit rejected id={id} errors={}", errors.len());
                state.errors = errors;
                return Ok(SubmitOutcome::Rejected);
            }

            state.errors.clear();
            let transition = transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.submit_count = state.submit_count.saturating_add(1);
            state.last_ticket += 1;
            let ticket = SubmissionTicket(state.last_ticket);

            let weak = Arc::downgrade(&self.shared);
            let task = self.scheduler.schedule_once(
                self.shared.options.acknowledge_after,
                Box::new(move || acknowledge(&weak, ticket)),
            );
            state.pending = Some((ticket, task.clone()));
            (transition, ticket, task)
        };
        debug!(
            "form: submit scheduled id={id} ticket={} after_ms={}",
            ticket.0,
            self.shared.options.acknowledge_after.as_millis()
        );
        emit(&self.shared, transition);

        let weak = Arc::downgrade(&self.shared);
        let canceller: Canceller = Arc::new(move |ticket| {
            weak.upgrade()
                .is_some_and(|shared| cancel_pending(&shared, Some(ticket)).unwrap_or(false))
        });
        Ok(SubmitOutcome::Scheduled(SubmissionHandle {
            ticket,
            task,
            canceller,
        }))
    }

    /// Cancels an in-flight submission, if any, and returns to `Idle`.
    pub fn cancel_submission(&self) -> FormResult<bool> {
        cancel_pending(&self.shared, None)
    }

    pub fn reset_to_initial(&self) -> FormResult<()> {
        let mut state = write_lock(&self.shared.state, "resetting form")?;
        state.model = state.initial_model.clone();
        state.errors.clear();
        Ok(())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T, E>> {
        let state = read_lock(&self.shared.state, "creating form snapshot")?;
        Ok(FormSnapshot {
            model: state.model.clone(),
            errors: state.errors.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_valid: state.errors.is_empty(),
        })
    }

    pub fn error_message<L>(&self, lens: L) -> FormResult<Option<String>>
    where
        L: FieldLens<T>,
    {
        Ok(read_lock(&self.shared.state, "reading field error")?
            .errors
            .get(&lens.key())
            .map(E::message))
    }

    fn run_validators(&self, model: &T) -> FormResult<FieldErrors<E>> {
        let field_validators =
            read_lock(&self.shared.field_validators, "reading field validators")?.clone();
        let form_validators =
            read_lock(&self.shared.form_validators, "reading form validators")?.clone();

        let mut errors = FieldErrors::new();
        for (key, validator) in field_validators {
            if errors.contains_key(&key) {
                continue;
            }
            if let Err(error) = validator(model) {
                errors.insert(key, error);
            }
        }
        for validator in form_validators {
            for (key, error) in validator(model) {
                errors.entry(key).or_insert(error);
            }
        }
        errors.retain(|key, _| T::field_keys().contains(key));
        Ok(errors)
    }
}

impl<T, E> Drop for FormController<T, E>
where
    T: FormModel,
    E: ValidationError,
{
    fn drop(&mut self) {
        let Ok(mut state) = self.shared.state.write() else {
            return;
        };
        if let Some((ticket, task)) = state.pending.take() {
            task.cancel();
            debug!(
                "form: disposed while submitting id={} ticket={}",
                self.shared.id.0, ticket.0
            );
        }
    }
}

fn acknowledge<T, E>(shared: &Weak<Shared<T, E>>, ticket: SubmissionTicket)
where
    T: FormModel,
    E: ValidationError,
{
    let Some(shared) = shared.upgrade() else {
        return;
    };
    if let Err(error) = complete_submission(&shared, ticket) {
        warn!(
            "form: acknowledgment failed id={} ticket={} error={error}",
            shared.id.0, ticket.0
        );
    }
}

fn complete_submission<T, E>(shared: &Shared<T, E>, ticket: SubmissionTicket) -> FormResult<()>
where
    T: FormModel,
    E: ValidationError,
{
    let succeeded = {
        let mut state = write_lock(&shared.state, "acknowledging submission")?;
        if !matches!(state.pending, Some((pending, _)) if pending == ticket) {
            debug!("form: stale acknowledgment id={} ticket={}", shared.id.0, ticket.0);
            return Ok(());
        }
        state.pending = None;
        transition_submit_state(&mut state, SubmitState::Succeeded)?
    };
    debug!("form: submission acknowledged id={} ticket={}", shared.id.0, ticket.0);
    emit(shared, succeeded);

    let notifier = read_lock(&shared.notifier, "reading notifier")?.clone();
    if let Some(notifier) = notifier {
        let options = &shared.options;
        notifier.notify(
            Notification::new(options.success_summary.clone(), options.success_detail.clone())
                .severity(Severity::Success)
                .life_ms(Some(options.notification_life_ms)),
        );
    }

    let idle = {
        let mut state = write_lock(&shared.state, "resetting after submission")?;
        state.model = state.initial_model.clone();
        state.errors.clear();
        transition_submit_state(&mut state, SubmitState::Idle)?
    };
    emit(shared, idle);
    Ok(())
}

fn cancel_pending<T, E>(shared: &Shared<T, E>, only: Option<SubmissionTicket>) -> FormResult<bool>
where
    T: FormModel,
    E: ValidationError,
{
    let transition = {
        let mut state = write_lock(&shared.state, "cancelling submission")?;
        let matches = match (&state.pending, only) {
            (Some((pending, _)), Some(ticket)) => *pending == ticket,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !matches {
            return Ok(false);
        }
        let Some((ticket, task)) = state.pending.take() else {
            return Ok(false);
        };
        task.cancel();
        debug!("form: submission cancelled id={} ticket={}", shared.id.0, ticket.0);
        transition_submit_state(&mut state, SubmitState::Idle)?
    };
    emit(shared, transition);
    Ok(true)
}

fn emit<T, E>(shared: &Shared<T, E>, (from, to): (SubmitState, SubmitState)) {
    let listeners = match shared.listeners.read() {
        Ok(listeners) => listeners.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    for listener in listeners {
        listener(from, to);
    }
}

pub(super) fn transition_submit_state<T, E>(
    state: &mut FormState<T, E>,
    next: SubmitState,
) -> FormResult<(SubmitState, SubmitState)> {
    let current = state.submit_state;
    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Idle)
            | (SubmitState::Succeeded, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok((current, next))
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
