use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, AbortRegistration, Abortable};
use futures::task::{Spawn, SpawnExt};
use futures_timer::Delay;
use tracing::warn;

use super::{OnceTask, RepeatingTask, Scheduler, TaskHandle, non_zero_period};

/// Real-time scheduler driving timers on any futures executor.
///
/// Cancelling a handle aborts the spawned future, which drops its pending
/// [`Delay`] right away instead of waiting for it to elapse.
#[derive(Clone, Debug)]
pub struct SpawnScheduler<S> {
    spawner: S,
}

impl<S> SpawnScheduler<S>
where
    S: Spawn + Send + Sync + 'static,
{
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    fn spawn_abortable<F>(&self, handle: &TaskHandle, future: F, registration: AbortRegistration)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let future = Abortable::new(future, registration).map(|_| ());
        if let Err(error) = self.spawner.spawn(future) {
            warn!(
                "scheduler: executor refused timer task id={:?} error={error}",
                handle.id()
            );
            handle.cancel();
        }
    }
}

impl<S> Scheduler for SpawnScheduler<S>
where
    S: Spawn + Send + Sync + 'static,
{
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TaskHandle {
        let (abort, registration) = AbortHandle::new_pair();
        let handle = TaskHandle::with_abort(abort);
        let status = handle.clone();
        self.spawn_abortable(
            &handle,
            async move {
                Delay::new(delay).await;
                if status.is_pending() {
                    task();
                    status.finish();
                }
            },
            registration,
        );
        handle
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> TaskHandle {
        let (abort, registration) = AbortHandle::new_pair();
        let handle = TaskHandle::with_abort(abort);
        let status = handle.clone();
        let period = non_zero_period(period);
        self.spawn_abortable(
            &handle,
            async move {
                loop {
                    Delay::new(period).await;
                    if !status.is_pending() {
                        return;
                    }
                    if task().is_break() {
                        status.finish();
                        return;
                    }
                }
            },
            registration,
        );
        handle
    }
}
