//! Cancellable timers for the form acknowledgment and counter ticks.
//!
//! Every scheduled task returns a [`TaskHandle`]. Owners keep the handle for
//! as long as the task may touch their state and cancel it when they are
//! disposed, so a late callback never runs against released state.

mod manual;
mod spawn;


use std::fmt::{Debug, Formatter};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

use futures::future::AbortHandle;

pub use manual::ManualScheduler;
pub use spawn::SpawnScheduler;

static TASK_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

const PENDING: u8 = 0;
const FINISHED: u8 = 1;
const CANCELLED: u8 = 2;

pub type OnceTask = Box<dyn FnOnce() + Send + 'static>;
pub type RepeatingTask = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn next() -> Self {
        Self(TASK_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

pub trait Scheduler: Send + Sync + 'static {
    /// Runs `task` once after `delay`.
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TaskHandle;

    /// Runs `task` every `period` until it returns [`ControlFlow::Break`] or
    /// the handle is cancelled.
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle;
}

#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    status: Arc<AtomicU8>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    pub(crate) fn new() -> Self {
        Self {
            id: TaskId::next(),
            status: Arc::new(AtomicU8::new(PENDING)),
            abort: None,
        }
    }

    pub(crate) fn with_abort(abort: AbortHandle) -> Self {
        Self {
            abort: Some(abort),
            ..Self::new()
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns `true` if this call cancelled a task that had not finished yet.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .status
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if cancelled {
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.status.load(Ordering::SeqCst) == PENDING
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.load(Ordering::SeqCst) == CANCELLED
    }

    pub fn is_finished(&self) -> bool {
        self.status.load(Ordering::SeqCst) == FINISHED
    }

    pub(crate) fn finish(&self) {
        let _ = self.status.compare_exchange(
            PENDING,
            FINISHED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

impl Debug for TaskHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let status = match self.status.load(Ordering::SeqCst) {
            PENDING => "pending",
            FINISHED => "finished",
            _ => "cancelled",
        };
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("status", &status)
            .finish()
    }
}

pub(crate) fn non_zero_period(period: Duration) -> Duration {
    if period.is_zero() {
        Duration::from_nanos(1)
    } else {
        period
    }
}
