use super::format::format_plain;

pub const DEFAULT_GAUGE_MAX: f64 = 100.0;

/// A progress bar or knob value clamped into `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaugeReading {
    pub value: f64,
    pub max: f64,
}

impl GaugeReading {
    pub fn new(value: f64, max: Option<f64>) -> Self {
        let max = max
            .filter(|max| max.is_finite() && *max > 0.0)
            .unwrap_or(DEFAULT_GAUGE_MAX);
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, max)
        };
        Self { value, max }
    }

    pub fn fraction(&self) -> f64 {
        self.value / self.max
    }

    pub fn display(&self, suffix: &str) -> String {
        format!("{}{suffix}", format_plain(self.value))
    }
}
