//! Transition audit utilities.
//!
//! Lightweight instrumentation hooks so callers can observe every checkpoint
//! the orchestrator passes through. Records capture a stage identifier plus
//! structured metadata; sinks decide whether to log, buffer or drop them.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Distinct checkpoints emitted by `TransitionStack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAuditStage {
    /// The stack applied its initial state.
    StackInitialized,
    /// A requested panel name did not resolve.
    LookupFailed,
    /// A request arrived while another transition was in flight.
    TransitionRejected,
    /// A transition was accepted.
    TransitionStarted,
    LockEngaged,
    /// A lifecycle hook or animation was invoked.
    StageStarted,
    /// A completion signal for the current stage was observed.
    StageCompleted,
    /// A completion handle was dropped without completing.
    CompletionAbandoned,
    LockReleased,
    /// The caller's completion callback ran (or there was none).
    TransitionFinished,
    PanelsActivated,
    PanelsDeactivated,
}

impl TransitionAuditStage {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionAuditStage::StackInitialized => "stack_initialized",
            TransitionAuditStage::LookupFailed => "lookup_failed",
            TransitionAuditStage::TransitionRejected => "transition_rejected",
            TransitionAuditStage::TransitionStarted => "transition_started",
            TransitionAuditStage::LockEngaged => "lock_engaged",
            TransitionAuditStage::StageStarted => "stage_started",
            TransitionAuditStage::StageCompleted => "stage_completed",
            TransitionAuditStage::CompletionAbandoned => "completion_abandoned",
            TransitionAuditStage::LockReleased => "lock_released",
            TransitionAuditStage::TransitionFinished => "transition_finished",
            TransitionAuditStage::PanelsActivated => "panels_activated",
            TransitionAuditStage::PanelsDeactivated => "panels_deactivated",
        }
    }
}

/// Structured audit entry.
#[derive(Debug, Clone)]
pub struct TransitionAuditEvent {
    pub timestamp: SystemTime,
    pub stage: TransitionAuditStage,
    pub details: Vec<(String, Value)>,
}

impl TransitionAuditEvent {
    fn new(stage: TransitionAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }
}

/// Builder helper to append fields ergonomically.
pub struct TransitionAuditEventBuilder {
    event: TransitionAuditEvent,
}

impl TransitionAuditEventBuilder {
    pub fn new(stage: TransitionAuditStage) -> Self {
        Self {
            event: TransitionAuditEvent::new(stage),
        }
    }

    pub fn detail(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> TransitionAuditEvent {
        self.event
    }
}

/// Trait implemented by any audit sink.
pub trait TransitionAudit: Send + Sync {
    fn record(&self, event: TransitionAuditEvent);
}

/// Default no-op implementation used when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullTransitionAudit;

impl TransitionAudit for NullTransitionAudit {
    fn record(&self, _event: TransitionAuditEvent) {}
}

/// Buffers every event in memory.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<TransitionAuditEvent>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TransitionAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<TransitionAuditStage> {
        self.events().into_iter().map(|event| event.stage).collect()
    }
}

impl TransitionAudit for RecordingAudit {
    fn record(&self, event: TransitionAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_accumulates_details() {
        let mut builder = TransitionAuditEventBuilder::new(TransitionAuditStage::StageStarted);
        builder
            .detail("panel", json!("PanelA"))
            .detail("stage", json!("will_disappear"));
        let event = builder.finish();
        assert_eq!(event.detail("panel"), Some(&json!("PanelA")));
        assert_eq!(event.details.len(), 2);
    }

    #[test]
    fn recording_audit_keeps_order() {
        let audit = RecordingAudit::new();
        audit.record(TransitionAuditEventBuilder::new(TransitionAuditStage::LockEngaged).finish());
        audit.record(TransitionAuditEventBuilder::new(TransitionAuditStage::LockReleased).finish());
        assert_eq!(
            audit.stages(),
            vec![
                TransitionAuditStage::LockEngaged,
                TransitionAuditStage::LockReleased
            ]
        );
    }
}
