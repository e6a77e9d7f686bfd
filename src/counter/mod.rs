mod animated;
mod count_up;
mod descriptor;
mod format;
mod gauge;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

pub use animated::{AnimatedCounter, CounterId, CounterPhase, CounterState};
pub use count_up::{CountUp, CounterFrame, count_up_stream};
pub use descriptor::{CounterSpec, DisplayKind};
pub use format::{NumberFormat, ONE_DECIMAL_TARGET, format_compact, format_fixed, format_plain};
pub use gauge::{DEFAULT_GAUGE_MAX, GaugeReading};

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum CounterError {
    #[error("counter target must be finite and non-negative, got {0}")]
    InvalidTarget(f64),
    #[error("counter state lock poisoned while {0}")]
    StatePoisoned(&'static str),
}

pub type CounterResult<T> = Result<T, CounterError>;

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> CounterResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| CounterError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> CounterResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| CounterError::StatePoisoned(context))
}
