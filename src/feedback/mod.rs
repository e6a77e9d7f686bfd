use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use tracing::debug;

use crate::schedule::Scheduler;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotificationId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warn",
            Severity::Error => "error",
        }
    }
}

/// A toast-style message handed to the display layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: Option<NotificationId>,
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub life_ms: Option<u32>,
}

impl Notification {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: None,
            severity: Severity::Info,
            summary: summary.into(),
            detail: detail.into(),
            life_ms: Some(3_000),
        }
    }

    pub fn severity(mut self, value: Severity) -> Self {
        self.severity = value;
        self
    }

    pub fn life_ms(mut self, value: Option<u32>) -> Self {
        self.life_ms = value;
        self
    }
}

pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification) + Send + Sync + 'static,
{
    fn notify(&self, notification: Notification) {
        (self)(notification)
    }
}

struct ToastState {
    visible: VecDeque<Notification>,
    max_visible: usize,
}

/// Bounded list of visible notifications. The oldest entry is evicted once
/// `max_visible` is exceeded; entries with a `life_ms` are dismissed by the
/// scheduler when one is attached.
#[derive(Clone)]
pub struct ToastQueue {
    next_id: Arc<AtomicU64>,
    state: Arc<RwLock<ToastState>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(ToastState {
                visible: VecDeque::new(),
                max_visible: 5,
            })),
            scheduler: None,
        }
    }

    pub fn with_scheduler(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
            ..Self::new()
        }
    }

    pub fn max_visible(self, value: usize) -> Self {
        write_state(&self.state).max_visible = value.max(1);
        self
    }

    pub fn show(&self, mut notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        notification.id = Some(id);
        let life_ms = notification.life_ms;

        {
            let mut state = write_state(&self.state);
            state.visible.push_back(notification);
            while state.visible.len() > state.max_visible {
                state.visible.pop_front();
            }
        }

        if let (Some(scheduler), Some(life_ms)) = (&self.scheduler, life_ms) {
            let state = Arc::downgrade(&self.state);
            scheduler.schedule_once(
                Duration::from_millis(u64::from(life_ms)),
                Box::new(move || expire(&state, id)),
            );
        }
        id
    }

    pub fn dismiss(&self, id: NotificationId) -> bool {
        remove(&mut write_state(&self.state), id)
    }

    pub fn dismiss_all(&self) {
        write_state(&self.state).visible.clear();
    }

    pub fn visible(&self) -> Vec<Notification> {
        read_state(&self.state).visible.iter().cloned().collect()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notification: Notification) {
        self.show(notification);
    }
}

fn expire(state: &Weak<RwLock<ToastState>>, id: NotificationId) {
    let Some(state) = state.upgrade() else {
        return;
    };
    if remove(&mut write_state(&state), id) {
        debug!("toast: expired id={}", id.0);
    }
}

fn remove(state: &mut ToastState, id: NotificationId) -> bool {
    match state.visible.iter().position(|entry| entry.id == Some(id)) {
        Some(index) => {
            state.visible.remove(index);
            true
        }
        None => false,
    }
}

fn read_state(lock: &RwLock<ToastState>) -> RwLockReadGuard<'_, ToastState> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_state(lock: &RwLock<ToastState>) -> RwLockWriteGuard<'_, ToastState> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
