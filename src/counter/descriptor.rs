use super::format::NumberFormat;
use super::gauge::GaugeReading;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisplayKind {
    Counter,
    Progress,
    Knob,
}

/// What a stat card shows. Never mutated once built.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterSpec {
    pub target: f64,
    pub suffix: String,
    pub kind: DisplayKind,
    pub max: Option<f64>,
    pub format: Option<NumberFormat>,
}

impl CounterSpec {
    pub fn counter(target: f64, suffix: impl Into<String>) -> Self {
        Self {
            target,
            suffix: suffix.into(),
            kind: DisplayKind::Counter,
            max: None,
            format: None,
        }
    }

    pub fn progress(target: f64, suffix: impl Into<String>) -> Self {
        Self {
            kind: DisplayKind::Progress,
            ..Self::counter(target, suffix)
        }
    }

    pub fn knob(target: f64, suffix: impl Into<String>) -> Self {
        Self {
            kind: DisplayKind::Knob,
            ..Self::counter(target, suffix)
        }
    }

    pub fn max(mut self, value: f64) -> Self {
        self.max = Some(value);
        self
    }

    pub fn format(mut self, value: NumberFormat) -> Self {
        self.format = Some(value);
        self
    }

    pub fn is_animated(&self) -> bool {
        self.kind == DisplayKind::Counter
    }

    pub fn number_format(&self, target: f64) -> NumberFormat {
        self.format.unwrap_or_else(|| NumberFormat::for_target(target))
    }

    pub fn gauge(&self, value: f64) -> GaugeReading {
        GaugeReading::new(value, self.max)
    }

    /// Display text for `current` while animating toward `target`.
    pub fn render(&self, current: f64, target: f64) -> String {
        match self.kind {
            DisplayKind::Counter => format!(
                "{}{}",
                self.number_format(target).render(current),
                self.suffix
            ),
            DisplayKind::Progress | DisplayKind::Knob => self.gauge(current).display(&self.suffix),
        }
    }
}
