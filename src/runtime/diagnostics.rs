use std::time::Duration;

use serde_json::{Value, json};

use crate::logging::{LIFECYCLE_TARGET, LogLevel, Logger, event_with_fields, json_kv};

use super::audit::{TransitionAudit, TransitionAuditEvent, TransitionAuditStage};
use super::transition::{Role, Stage, TransitionId, TransitionKind};

/// Audit sink that forwards transition checkpoints to a [`Logger`].
pub struct LifecycleLoggerAudit {
    logger: Logger,
    level: LogLevel,
    log_stages: bool,
    log_activation: bool,
}

impl LifecycleLoggerAudit {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
            log_stages: true,
            log_activation: true,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Per-stage start/complete events are the noisiest part of the trail.
    pub fn log_stages(mut self, enabled: bool) -> Self {
        self.log_stages = enabled;
        self
    }

    pub fn log_activation(mut self, enabled: bool) -> Self {
        self.log_activation = enabled;
        self
    }

    fn level_for(&self, stage: TransitionAuditStage) -> LogLevel {
        match stage {
            TransitionAuditStage::CompletionAbandoned => LogLevel::Error,
            TransitionAuditStage::LookupFailed | TransitionAuditStage::TransitionRejected => {
                LogLevel::Warn
            }
            _ => self.level,
        }
    }
}

impl TransitionAudit for LifecycleLoggerAudit {
    fn record(&self, event: TransitionAuditEvent) {
        match event.stage {
            TransitionAuditStage::StageStarted | TransitionAuditStage::StageCompleted
                if !self.log_stages =>
            {
                return;
            }
            TransitionAuditStage::PanelsActivated | TransitionAuditStage::PanelsDeactivated
                if !self.log_activation =>
            {
                return;
            }
            _ => {}
        }
        let level = self.level_for(event.stage);
        let message = format!("audit.{}", event.stage.as_str());
        let log_event = event_with_fields(level, LIFECYCLE_TARGET, &message, event.details);
        let _ = self.logger.log_event(log_event);
    }
}

/// Diagnostic describing a transition that is waiting on, or has lost, its
/// completion signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StallReport {
    pub transition: TransitionId,
    pub kind: TransitionKind,
    pub panel: String,
    pub role: Role,
    pub stage: Stage,
    pub waiting: Duration,
    /// The stage's completion handle was dropped; it can never resume.
    pub abandoned: bool,
}

impl StallReport {
    pub fn as_fields(&self) -> Vec<(String, Value)> {
        vec![
            json_kv("transition", self.transition.get()),
            json_kv("kind", self.kind.as_str()),
            json_kv("panel", self.panel.clone()),
            json_kv("stage", self.stage.as_str()),
            json_kv("waiting_ms", json!(self.waiting.as_millis() as u64)),
            json_kv("abandoned", self.abandoned),
        ]
    }
}
