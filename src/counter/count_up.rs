use std::iter::FusedIterator;
use std::time::Duration;

use futures::Stream;
use futures::stream;
use futures_timer::Delay;

use super::{CounterError, CounterResult};
use crate::motion::CounterMotion;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterFrame {
    /// Time since the animation started.
    pub at: Duration,
    pub value: f64,
    pub last: bool,
}

/// The frames of one count-up animation.
///
/// Each step adds `target / steps` to a running total and yields its floor,
/// until the total reaches the target, which is yielded exactly and ends the
/// sequence. Floating-point accumulation may need one extra step.
#[derive(Clone, Debug)]
pub struct CountUp {
    target: f64,
    increment: f64,
    accumulated: f64,
    interval: Duration,
    elapsed: Duration,
    finished: bool,
}

impl CountUp {
    pub fn new(target: f64, motion: CounterMotion) -> CounterResult<Self> {
        if !target.is_finite() || target < 0.0 {
            return Err(CounterError::InvalidTarget(target));
        }
        Ok(Self {
            target,
            increment: target / f64::from(motion.steps.max(1)),
            accumulated: 0.0,
            interval: motion.interval(),
            elapsed: Duration::ZERO,
            finished: false,
        })
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Iterator for CountUp {
    type Item = CounterFrame;

    fn next(&mut self) -> Option<CounterFrame> {
        if self.finished {
            return None;
        }
        self.accumulated += self.increment;
        self.elapsed += self.interval;
        let value = if self.accumulated >= self.target {
            self.finished = true;
            self.target
        } else {
            self.accumulated.floor()
        };
        Some(CounterFrame {
            at: self.elapsed,
            value,
            last: self.finished,
        })
    }
}

impl FusedIterator for CountUp {}

/// Yields the frames of `count_up` in real time, one per interval.
pub fn count_up_stream(count_up: CountUp) -> impl Stream<Item = CounterFrame> {
    stream::unfold(count_up, |mut count_up| async move {
        let interval = count_up.interval();
        let Some(frame) = count_up.next() else {
            return None;
        };
        Delay::new(interval).await;
        Some((frame, count_up))
    })
}
