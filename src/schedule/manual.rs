use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::{OnceTask, RepeatingTask, Scheduler, TaskHandle, non_zero_period};

enum Job {
    Once(OnceTask),
    Repeating {
        period: Duration,
        task: RepeatingTask,
    },
}

struct Entry {
    handle: TaskHandle,
    job: Job,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Entry>,
}

impl ManualState {
    fn push(&mut self, at: Duration, entry: Entry) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((at, seq), entry);
    }
}

/// Virtual-time scheduler. Nothing runs until [`ManualScheduler::advance`]
/// moves the clock; tasks due at the same instant run in scheduling order.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of queued tasks that have not been cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .values()
            .filter(|entry| entry.handle.is_pending())
            .count()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.lock()
            .queue
            .iter()
            .find(|(_, entry)| entry.handle.is_pending())
            .map(|((at, _), _)| *at)
    }

    /// Moves the clock forward by `by`, running every task that falls due.
    /// Returns the number of task invocations.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut runs = 0;
        while let Some((at, entry)) = self.pop_due(target) {
            if entry.handle.is_cancelled() {
                continue;
            }
            runs += 1;
            match entry.job {
                Job::Once(task) => {
                    task();
                    entry.handle.finish();
                }
                Job::Repeating { period, mut task } => {
                    let flow = task();
                    if flow.is_break() || entry.handle.is_cancelled() {
                        entry.handle.finish();
                        continue;
                    }
                    self.lock().push(
                        at.saturating_add(period),
                        Entry {
                            handle: entry.handle,
                            job: Job::Repeating { period, task },
                        },
                    );
                }
            }
        }
        let mut state = self.lock();
        if state.now < target {
            state.now = target;
        }
        runs
    }

    /// Advances deadline by deadline until no live task is queued, giving up
    /// after `max_runs` invocations.
    pub fn run_until_idle(&self, max_runs: usize) -> usize {
        let mut runs = 0;
        while runs < max_runs {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            let by = deadline.saturating_sub(self.now());
            let ran = self.advance(by);
            if ran == 0 && self.next_deadline() == Some(deadline) {
                break;
            }
            runs += ran;
        }
        runs
    }

    fn pop_due(&self, target: Duration) -> Option<(Duration, Entry)> {
        let mut state = self.lock();
        let key = *state.queue.keys().next()?;
        if key.0 > target {
            return None;
        }
        let entry = state.queue.remove(&key)?;
        state.now = state.now.max(key.0);
        Some((key.0, entry))
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut state = self.lock();
        let at = state.now.saturating_add(delay);
        state.push(
            at,
            Entry {
                handle: handle.clone(),
                job: Job::Once(task),
            },
        );
        handle
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle {
        let handle = TaskHandle::new();
        let period = non_zero_period(period);
        let mut state = self.lock();
        let at = state.now.saturating_add(period);
        state.push(
            at,
            Entry {
                handle: handle.clone(),
                job: Job::Repeating { period, task },
            },
        );
        handle
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("queued", &state.queue.len())
            .finish()
    }
}

