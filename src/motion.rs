use std::time::Duration;

/// Timing of a count-up animation: `steps` equal ticks spread over
/// `duration_ms`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CounterMotion {
    pub duration_ms: u32,
    pub steps: u32,
}

impl Default for CounterMotion {
    fn default() -> Self {
        Self {
            duration_ms: 2_000,
            steps: 60,
        }
    }
}

impl CounterMotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duration_ms(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps.max(1);
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms)) / self.steps.max(1)
    }
}
