use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by the orchestrator across transitions.
#[derive(Debug, Default, Clone)]
pub struct TransitionMetrics {
    started: u64,
    finished: u64,
    rejected: u64,
    lookup_failures: u64,
    stages_completed: u64,
    stalls: u64,
}

impl TransitionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&mut self) {
        self.started = self.started.saturating_add(1);
    }

    pub fn record_finished(&mut self) {
        self.finished = self.finished.saturating_add(1);
    }

    pub fn record_rejected(&mut self) {
        self.rejected = self.rejected.saturating_add(1);
    }

    pub fn record_lookup_failure(&mut self) {
        self.lookup_failures = self.lookup_failures.saturating_add(1);
    }

    pub fn record_stage_completed(&mut self) {
        self.stages_completed = self.stages_completed.saturating_add(1);
    }

    pub fn record_stall(&mut self) {
        self.stalls = self.stalls.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            started: self.started,
            finished: self.finished,
            rejected: self.rejected,
            lookup_failures: self.lookup_failures,
            stages_completed: self.stages_completed,
            stalls: self.stalls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub started: u64,
    pub finished: u64,
    pub rejected: u64,
    pub lookup_failures: u64,
    pub stages_completed: u64,
    pub stalls: u64,
}

impl MetricSnapshot {
    /// Transitions accepted but not yet finished (in flight or stalled).
    pub fn unfinished(&self) -> u64 {
        self.started.saturating_sub(self.finished)
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "transition_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("started".to_string(), json!(self.started));
        map.insert("finished".to_string(), json!(self.finished));
        map.insert("rejected".to_string(), json!(self.rejected));
        map.insert("lookup_failures".to_string(), json!(self.lookup_failures));
        map.insert("stages_completed".to_string(), json!(self.stages_completed));
        map.insert("stalls".to_string(), json!(self.stalls));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_unfinished() {
        let mut metrics = TransitionMetrics::new();
        metrics.record_started();
        metrics.record_started();
        metrics.record_finished();
        let snapshot = metrics.snapshot(Duration::from_millis(42));
        assert_eq!(snapshot.unfinished(), 1);
        assert_eq!(snapshot.uptime_ms, 42);
    }

    #[test]
    fn log_event_carries_counters() {
        let mut metrics = TransitionMetrics::new();
        metrics.record_lookup_failure();
        metrics.record_stage_completed();
        let event = metrics
            .snapshot(Duration::ZERO)
            .to_log_event("panels::stack.metrics");
        assert_eq!(event.message, "transition_metrics");
        assert_eq!(event.field("lookup_failures"), Some(&json!(1)));
        assert_eq!(event.field("stages_completed"), Some(&json!(1)));
    }
}
