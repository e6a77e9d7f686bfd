use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tracing::{debug, trace};

use super::count_up::CountUp;
use super::descriptor::CounterSpec;
use super::{CounterResult, read_lock, write_lock};
use crate::motion::CounterMotion;
use crate::schedule::{Scheduler, TaskHandle};

static COUNTER_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CounterId(pub u64);

impl CounterId {
    pub fn next() -> Self {
        Self(COUNTER_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CounterPhase {
    Idle,
    Running,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterState {
    pub current: f64,
    pub target: f64,
    pub phase: CounterPhase,
    pub generation: u64,
}

pub(super) struct CounterInner {
    state: CounterState,
    pending: Option<TaskHandle>,
}

/// A stat value that counts up from 0 on a scheduler.
///
/// At most one tick schedule is live per counter. Starting again cancels it
/// and restarts from 0; dropping the counter cancels it for good.
pub struct AnimatedCounter {
    id: CounterId,
    spec: CounterSpec,
    motion: CounterMotion,
    inner: Arc<RwLock<CounterInner>>,
    scheduler: Arc<dyn Scheduler>,
}

impl AnimatedCounter {
    pub fn new(spec: CounterSpec, motion: CounterMotion, scheduler: Arc<dyn Scheduler>) -> Self {
        let target = spec.target;
        Self {
            id: CounterId::next(),
            spec,
            motion,
            inner: Arc::new(RwLock::new(CounterInner {
                state: CounterState {
                    current: 0.0,
                    target,
                    phase: CounterPhase::Idle,
                    generation: 0,
                },
                pending: None,
            })),
            scheduler,
        }
    }

    pub fn id(&self) -> CounterId {
        self.id
    }

    pub fn spec(&self) -> &CounterSpec {
        &self.spec
    }

    /// Starts toward the descriptor's own target.
    pub fn mount(&self) -> CounterResult<Option<TaskHandle>> {
        self.start(self.spec.target)
    }

    /// Restarts from 0 toward `target`. Gauge kinds settle immediately and
    /// return no handle.
    pub fn start(&self, target: f64) -> CounterResult<Option<TaskHandle>> {
        if !self.spec.is_animated() {
            let reading = self.spec.gauge(target);
            let mut inner = write_lock(&self.inner, "settling gauge")?;
            if let Some(task) = inner.pending.take() {
                task.cancel();
            }
            let generation = inner.state.generation + 1;
            inner.state = CounterState {
                current: reading.value,
                target: reading.value,
                phase: CounterPhase::Completed,
                generation,
            };
            return Ok(None);
        }

        let mut frames = CountUp::new(target, self.motion)?;
        let mut inner = write_lock(&self.inner, "starting counter")?;
        if let Some(task) = inner.pending.take() {
            if task.cancel() {
                debug!(
                    "counter: restarted id={} from={} to={target}",
                    self.id.0, inner.state.current
                );
            }
        }
        let generation = inner.state.generation + 1;
        inner.state = CounterState {
            current: 0.0,
            target,
            phase: CounterPhase::Running,
            generation,
        };

        let weak = Arc::downgrade(&self.inner);
        let id = self.id;
        let task = self.scheduler.schedule_repeating(
            frames.interval(),
            Box::new(move || tick(&weak, id, generation, &mut frames)),
        );
        inner.pending = Some(task.clone());
        debug!(
            "counter: started id={} target={target} interval_us={}",
            id.0,
            self.motion.interval().as_micros()
        );
        Ok(Some(task))
    }

    /// Stops ticking and keeps the value reached so far.
    pub fn cancel(&self) -> CounterResult<bool> {
        let mut inner = write_lock(&self.inner, "cancelling counter")?;
        let Some(task) = inner.pending.take() else {
            return Ok(false);
        };
        task.cancel();
        inner.state.phase = CounterPhase::Idle;
        Ok(true)
    }

    pub fn state(&self) -> CounterResult<CounterState> {
        Ok(read_lock(&self.inner, "reading counter state")?.state)
    }

    pub fn current(&self) -> CounterResult<f64> {
        Ok(self.state()?.current)
    }

    pub fn display(&self) -> CounterResult<String> {
        let state = self.state()?;
        Ok(self.spec.render(state.current, state.target))
    }
}

impl Drop for AnimatedCounter {
    fn drop(&mut self) {
        let Ok(mut inner) = self.inner.write() else {
            return;
        };
        if let Some(task) = inner.pending.take() {
            task.cancel();
            debug!("counter: disposed while running id={}", self.id.0);
        }
    }
}

fn tick(
    inner: &Weak<RwLock<CounterInner>>,
    id: CounterId,
    generation: u64,
    frames: &mut CountUp,
) -> ControlFlow<()> {
    let Some(inner) = inner.upgrade() else {
        return ControlFlow::Break(());
    };
    let Ok(mut guard) = inner.write() else {
        return ControlFlow::Break(());
    };
    if guard.state.generation != generation {
        return ControlFlow::Break(());
    }
    let Some(frame) = frames.next() else {
        guard.state.phase = CounterPhase::Completed;
        guard.pending = None;
        return ControlFlow::Break(());
    };

    guard.state.current = frame.value;
    trace!("counter: tick id={} value={}", id.0, frame.value);
    if frame.last {
        guard.state.phase = CounterPhase::Completed;
        guard.pending = None;
        debug!("counter: completed id={} value={}", id.0, frame.value);
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}
