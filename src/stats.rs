//! The landing page's stats section.

use std::sync::Arc;

use crate::counter::{AnimatedCounter, CounterResult, CounterSpec};
use crate::motion::CounterMotion;
use crate::schedule::{Scheduler, TaskHandle};

#[derive(Clone, Debug, PartialEq)]
pub struct StatItem {
    pub icon: String,
    pub label: String,
    pub counter: CounterSpec,
    pub color: String,
}

impl StatItem {
    pub fn new(
        icon: impl Into<String>,
        label: impl Into<String>,
        counter: CounterSpec,
        color: impl Into<String>,
    ) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
            counter,
            color: color.into(),
        }
    }

    /// Hex fill for the progress bar or knob, picked from the color class.
    pub fn accent_hex(&self) -> &'static str {
        if self.color.contains("blue") {
            "#3B82F6"
        } else if self.color.contains("emerald") {
            "#10B981"
        } else if self.color.contains("yellow") {
            "#F59E0B"
        } else {
            "#8B5CF6"
        }
    }
}

pub fn default_stats() -> Vec<StatItem> {
    vec![
        StatItem::new(
            "pi pi-users",
            "Active Users",
            CounterSpec::counter(50_000.0, "+"),
            "text-blue-600",
        ),
        StatItem::new(
            "pi pi-chart-line",
            "Growth Rate",
            CounterSpec::progress(85.0, "%").max(100.0),
            "text-emerald-600",
        ),
        StatItem::new(
            "pi pi-star",
            "User Rating",
            CounterSpec::knob(4.9, "/5").max(5.0),
            "text-yellow-500",
        ),
        StatItem::new(
            "pi pi-download",
            "Downloads",
            CounterSpec::counter(250_000.0, "+"),
            "text-purple-600",
        ),
    ]
}

/// One live counter per stat item, in item order.
pub struct StatBoard {
    items: Vec<StatItem>,
    counters: Vec<AnimatedCounter>,
}

impl StatBoard {
    pub fn new(items: Vec<StatItem>, motion: CounterMotion, scheduler: Arc<dyn Scheduler>) -> Self {
        let counters = items
            .iter()
            .map(|item| AnimatedCounter::new(item.counter.clone(), motion, scheduler.clone()))
            .collect();
        Self { items, counters }
    }

    /// Starts every counter. Only animated kinds yield a handle.
    pub fn mount(&self) -> CounterResult<Vec<TaskHandle>> {
        let mut handles = Vec::new();
        for counter in &self.counters {
            if let Some(handle) = counter.mount()? {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    pub fn items(&self) -> &[StatItem] {
        &self.items
    }

    pub fn counters(&self) -> &[AnimatedCounter] {
        &self.counters
    }

    pub fn displays(&self) -> CounterResult<Vec<String>> {
        self.counters.iter().map(AnimatedCounter::display).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::DisplayKind;
    use crate::schedule::ManualScheduler;

    #[test]
    fn default_stats_match_the_landing_page() {
        let stats = default_stats();
        let labels: Vec<&str> = stats.iter().map(|item| item.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Active Users", "Growth Rate", "User Rating", "Downloads"]
        );
        assert_eq!(stats[1].counter.kind, DisplayKind::Progress);
        assert_eq!(stats[2].counter.kind, DisplayKind::Knob);
        assert_eq!(stats[2].counter.max, Some(5.0));
        assert_eq!(stats[1].accent_hex(), "#10B981");
        assert_eq!(stats[2].accent_hex(), "#F59E0B");
        assert_eq!(stats[3].accent_hex(), "#8B5CF6");
    }

    #[test]
    fn board_animates_counters_and_settles_gauges() {
        let scheduler = Arc::new(ManualScheduler::new());
        let board = StatBoard::new(default_stats(), CounterMotion::default(), scheduler.clone());

        let handles = board.mount().expect("mount board");
        assert_eq!(handles.len(), 2);
        assert_eq!(
            board.displays().expect("displays"),
            vec!["0+", "85%", "4.9/5", "0+"]
        );

        scheduler.run_until_idle(500);
        assert_eq!(
            board.displays().expect("displays"),
            vec!["50.0K+", "85%", "4.9/5", "250.0K+"]
        );
        assert!(handles.iter().all(|handle| handle.is_finished()));
    }

    #[test]
    fn dropping_the_board_cancels_running_counters() {
        let scheduler = Arc::new(ManualScheduler::new());
        let board = StatBoard::new(default_stats(), CounterMotion::default(), scheduler.clone());
        let handles = board.mount().expect("mount board");

        drop(board);

        assert!(handles.iter().all(|handle| handle.is_cancelled()));
        assert_eq!(scheduler.pending(), 0);
    }
}
