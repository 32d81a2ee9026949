//! Ordered transitions between mutually exclusive screen panels.
//!
//! At most one panel is the active target of user input. Switching panels runs
//! a fixed pipeline of lifecycle hooks and animations, each resumed only by an
//! explicit [`Completion`], with the [`InputLock`] engaged for the whole
//! duration. [`TransitionStack`] owns that pipeline; panels implement
//! [`Panel`] and are registered by name in a [`PanelRegistry`].

pub mod error;
pub mod logging;
pub mod metrics;
pub mod panel;
pub mod registry;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use error::{PanelError, Result};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, TransitionMetrics};
pub use panel::{
    Panel, PanelCandidate, PanelHandle, PanelLifecycle, PanelPhase, SharedPanel, shared,
};
pub use registry::PanelRegistry;
pub use runtime::activation::ActiveSet;
pub use runtime::audit::{
    NullTransitionAudit, RecordingAudit, TransitionAudit, TransitionAuditEvent,
    TransitionAuditEventBuilder, TransitionAuditStage,
};
pub use runtime::diagnostics::{LifecycleLoggerAudit, StallReport};
pub use runtime::input::{InputDispatch, InputGate, InputLock};
pub use runtime::signal::{Completion, StageTicket};
pub use runtime::transition::{
    InFlight, OnFinished, Role, Stage, Step, TransitionId, TransitionKind, TransitionStatus,
};
pub use runtime::{StackConfig, StackSettings, TransitionStack};
