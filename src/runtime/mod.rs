use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{PanelError, Result};
use crate::logging::{LogLevel, Logger, STACK_TARGET, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, TransitionMetrics};
use crate::panel::{PanelCandidate, PanelHandle};
use crate::registry::PanelRegistry;

pub mod activation;
pub mod audit;
pub mod diagnostics;
pub mod input;
pub mod signal;
pub mod transition;

use activation::ActiveSet;
use audit::{TransitionAudit, TransitionAuditEventBuilder, TransitionAuditStage};
use diagnostics::StallReport;
use input::{InputDispatch, InputLock};
use signal::{Completion, Signal, SignalKind, SignalQueue, StageTicket};
use transition::{
    InFlight, OnFinished, Role, Stage, TransitionId, TransitionKind, TransitionRequest,
    TransitionStatus,
};

pub const DEFAULT_PANEL_TAG: &str = "UIPanel";
pub const DEFAULT_INITIAL_PANEL: &str = "MainMenuPanel";
pub const DEFAULT_ALWAYS_ACTIVE_PANEL: &str = "GameScenePanel";
pub const DEFAULT_METRICS_TARGET: &str = "panels::stack.metrics";

/// Serializable settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSettings {
    /// Tag a discovered candidate must carry to be registered.
    pub panel_tag: String,
    /// Panel that starts presented and current.
    pub initially_presented: Option<String>,
    /// Panel exempt from `activate_all` / `deactivate_all`.
    pub always_active: Option<String>,
    /// When set, `pump` reports a stage waiting longer than this as stalled.
    pub stall_threshold_ms: Option<u64>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            panel_tag: DEFAULT_PANEL_TAG.to_string(),
            initially_presented: Some(DEFAULT_INITIAL_PANEL.to_string()),
            always_active: Some(DEFAULT_ALWAYS_ACTIVE_PANEL.to_string()),
            stall_threshold_ms: None,
            metrics_target: DEFAULT_METRICS_TARGET.to_string(),
        }
    }
}

impl StackSettings {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn stall_threshold(&self) -> Option<Duration> {
        self.stall_threshold_ms.map(Duration::from_millis)
    }
}

/// Configuration knobs for the transition stack.
#[derive(Clone, Default)]
pub struct StackConfig {
    pub settings: StackSettings,
    /// Optional structured logger used by the stack.
    pub logger: Option<Logger>,
    /// Metrics accumulator; `None` disables counting.
    pub metrics: Option<Arc<Mutex<TransitionMetrics>>>,
    /// Optional audit sink receiving every checkpoint.
    pub audit: Option<Arc<dyn TransitionAudit>>,
}

impl StackConfig {
    pub fn with_settings(settings: StackSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(TransitionMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<TransitionMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Drives panels through ordered disappear/appear pipelines.
///
/// Each entry operation resolves its panels, engages the input lock and walks
/// a fixed step plan. A step invokes one hook on one panel and then waits for
/// that hook's [`Completion`]. Completions land in a queue; the stack drains
/// it before an entry operation returns and again on every [`pump`].
///
/// [`pump`]: TransitionStack::pump
pub struct TransitionStack {
    registry: PanelRegistry,
    config: StackConfig,
    active_set: ActiveSet,
    lock: InputLock,
    dispatch: Option<Box<dyn InputDispatch>>,
    previous: Option<PanelHandle>,
    current: Option<PanelHandle>,
    in_flight: Option<TransitionRequest>,
    signals: SignalQueue,
    next_id: u64,
    created_at: Instant,
}

impl TransitionStack {
    pub fn new(registry: PanelRegistry, config: StackConfig) -> Result<Self> {
        let active_set = ActiveSet::new(config.settings.always_active.clone());
        let mut stack = Self {
            registry,
            config,
            active_set,
            lock: InputLock::new(),
            dispatch: None,
            previous: None,
            current: None,
            in_flight: None,
            signals: SignalQueue::new(),
            next_id: 1,
            created_at: Instant::now(),
        };
        stack.apply_initial_state()?;
        Ok(stack)
    }

    /// Build the registry from tagged candidates, then the stack.
    pub fn discover<I>(candidates: I, config: StackConfig) -> Result<Self>
    where
        I: IntoIterator<Item = PanelCandidate>,
    {
        let registry = PanelRegistry::discover(candidates, &config.settings.panel_tag)?;
        Self::new(registry, config)
    }

    /// Route lock changes to the host's input system as well.
    pub fn set_input_dispatch<D>(&mut self, dispatch: D)
    where
        D: InputDispatch + 'static,
    {
        let mut dispatch: Box<dyn InputDispatch> = Box::new(dispatch);
        dispatch.set_enabled(!self.lock.is_engaged());
        self.dispatch = Some(dispatch);
    }

    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn input_lock(&self) -> &InputLock {
        &self.lock
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_engaged()
    }

    pub fn current_panel(&self) -> Option<&PanelHandle> {
        self.current.as_ref()
    }

    pub fn previous_panel(&self) -> Option<&PanelHandle> {
        self.previous.as_ref()
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight.as_ref().and_then(TransitionRequest::snapshot)
    }

    /// Leave `sender` and land on `target`.
    pub fn present(
        &mut self,
        target: &str,
        sender: &str,
        on_finished: Option<OnFinished>,
    ) -> Result<TransitionStatus> {
        let sender = self.resolve(sender)?;
        let target = self.resolve(target)?;
        self.begin(TransitionKind::Present, Some(sender), target, on_finished)
    }

    /// Land on `target` without leaving anything.
    pub fn present_target(
        &mut self,
        target: &str,
        on_finished: Option<OnFinished>,
    ) -> Result<TransitionStatus> {
        let target = self.resolve(target)?;
        self.begin(TransitionKind::PresentWithoutSender, None, target, on_finished)
    }

    /// Take `target` off screen; nothing replaces it.
    pub fn hide_target(
        &mut self,
        target: &str,
        on_finished: Option<OnFinished>,
    ) -> Result<TransitionStatus> {
        let target = self.resolve(target)?;
        self.begin(TransitionKind::Hide, None, target, on_finished)
    }

    /// Process completion signals delivered since the last call.
    pub fn pump(&mut self) -> Result<TransitionStatus> {
        let finished = self.drain()?;
        if let Some(threshold) = self.config.settings.stall_threshold() {
            self.check_stall(threshold)?;
        }
        Ok(self.status_after(finished))
    }

    pub fn activate_all(&mut self) -> Result<usize> {
        let toggled = self.active_set.apply(&self.registry, true)?;
        self.audit(TransitionAuditStage::PanelsActivated, [json_kv("panels", toggled)]);
        Ok(toggled)
    }

    pub fn deactivate_all(&mut self) -> Result<usize> {
        let toggled = self.active_set.apply(&self.registry, false)?;
        self.audit(TransitionAuditStage::PanelsDeactivated, [json_kv("panels", toggled)]);
        Ok(toggled)
    }

    pub fn stall_report(&self) -> Option<StallReport> {
        let request = self.in_flight.as_ref()?;
        let step = request.current_step()?;
        let panel = request.participant(step.role)?.name().to_string();
        Some(StallReport {
            transition: request.id,
            kind: request.kind,
            panel,
            role: step.role,
            stage: step.stage,
            waiting: request.stage_started.elapsed(),
            abandoned: request.stalled,
        })
    }

    /// Fails when the current stage has lost its completion or has been
    /// waiting longer than `threshold`.
    pub fn check_stall(&self, threshold: Duration) -> Result<()> {
        match self.stall_report() {
            Some(report) if report.abandoned || report.waiting > threshold => {
                self.log(LogLevel::Warn, "transition_stalled", report.as_fields());
                Err(PanelError::StalledTransition {
                    transition: report.transition.get(),
                    panel: report.panel,
                    stage: report.stage.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.created_at.elapsed()))
    }

    /// Write the current metrics snapshot through the configured logger.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) =
            (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let event = snapshot.to_log_event(&self.config.settings.metrics_target);
            let _ = logger.log_event(event);
        }
    }

    fn apply_initial_state(&mut self) -> Result<()> {
        let Some(name) = self.config.settings.initially_presented.clone() else {
            return Ok(());
        };
        match self.registry.get(&name).cloned() {
            Some(handle) => {
                handle.lock()?.lifecycle_mut().restore_presented();
                self.previous = Some(handle.clone());
                self.current = Some(handle);
                self.audit(
                    TransitionAuditStage::StackInitialized,
                    [json_kv("initial", name.as_str())],
                );
            }
            None => {
                self.log(
                    LogLevel::Warn,
                    "initial_panel_missing",
                    [json_kv("panel", name.as_str())],
                );
            }
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<PanelHandle> {
        match self.registry.resolve(name) {
            Ok(handle) => Ok(handle.clone()),
            Err(err) => {
                self.log(LogLevel::Warn, "panel_not_found", [json_kv("panel", name)]);
                self.audit(TransitionAuditStage::LookupFailed, [json_kv("panel", name)]);
                self.record_metric(TransitionMetrics::record_lookup_failure);
                Err(err)
            }
        }
    }

    fn begin(
        &mut self,
        kind: TransitionKind,
        sender: Option<PanelHandle>,
        target: PanelHandle,
        on_finished: Option<OnFinished>,
    ) -> Result<TransitionStatus> {
        if let Some(active) = self.in_flight.as_ref() {
            let active = active.id;
            let fields = [
                json_kv("active", active.get()),
                json_kv("kind", kind.as_str()),
                json_kv("target", target.name()),
            ];
            self.log(LogLevel::Warn, "transition_rejected", fields.clone());
            self.audit(TransitionAuditStage::TransitionRejected, fields);
            self.record_metric(TransitionMetrics::record_rejected);
            return Err(PanelError::TransitionInFlight {
                active: active.get(),
                requested: target.name().to_string(),
            });
        }

        let id = TransitionId(self.next_id);
        self.next_id += 1;

        let (previous, current) = match kind {
            TransitionKind::Present => (sender.clone(), Some(target.clone())),
            TransitionKind::PresentWithoutSender => (None, Some(target.clone())),
            TransitionKind::Hide => (None, None),
        };
        self.previous = previous;
        self.current = current;

        let fields = [
            json_kv("transition", id.get()),
            json_kv("kind", kind.as_str()),
            json_kv(
                "sender",
                sender
                    .as_ref()
                    .map(|handle| Value::from(handle.name()))
                    .unwrap_or(Value::Null),
            ),
            json_kv("target", target.name()),
        ];
        self.log(LogLevel::Info, "transition_started", fields.clone());
        self.audit(TransitionAuditStage::TransitionStarted, fields);
        self.record_metric(TransitionMetrics::record_started);

        self.engage_lock(id);
        self.in_flight = Some(TransitionRequest::new(id, kind, sender, target, on_finished));
        self.dispatch_current()?;
        let finished = self.drain()?;
        Ok(self.status_after(finished))
    }

    /// Invoke the hook for the step the in-flight transition is sitting on.
    fn dispatch_current(&mut self) -> Result<()> {
        let Some(request) = self.in_flight.as_mut() else {
            return Ok(());
        };
        let Some(step) = request.current_step() else {
            return Ok(());
        };
        let Some(panel) = request.participant(step.role).cloned() else {
            return Ok(());
        };
        request.stage_started = Instant::now();
        let ticket = StageTicket {
            transition: request.id,
            step: request.step,
            role: step.role,
            stage: step.stage,
        };
        let sender = request
            .sender
            .clone()
            .filter(|sender| !sender.same_panel(&panel));

        self.audit(
            TransitionAuditStage::StageStarted,
            Self::ticket_fields(&ticket, panel.name()),
        );

        let mut guard = match panel.lock() {
            Ok(guard) => guard,
            Err(err) => {
                self.abort_in_flight(&ticket, panel.name());
                return Err(err);
            }
        };
        let on_done = Completion::new(ticket, self.signals.clone());
        match step.stage {
            Stage::WillDisappear => guard.will_disappear(on_done),
            Stage::DisappearAnimation => guard.run_disappear_animation(on_done),
            Stage::DidDisappear => guard.did_disappear(on_done),
            Stage::WillAppear => guard.will_appear(sender.as_ref(), on_done),
            Stage::AppearAnimation => guard.run_appear_animation(on_done),
            Stage::DidAppear => guard.did_appear(sender.as_ref(), on_done),
        }
        Ok(())
    }

    /// Feed every queued signal to [`Self::advance`]. Returns the id of a
    /// transition that finished while draining.
    fn drain(&mut self) -> Result<Option<TransitionId>> {
        let mut finished = None;
        while let Some(signal) = self.signals.pop() {
            if let Some(id) = self.advance(signal)? {
                finished = Some(id);
            }
        }
        Ok(finished)
    }

    /// Single entry point that moves a transition forward.
    fn advance(&mut self, signal: Signal) -> Result<Option<TransitionId>> {
        let ticket = signal.ticket;
        let Some(request) = self.in_flight.as_mut() else {
            self.log(LogLevel::Debug, "stale_signal", Self::ticket_fields(&ticket, ""));
            return Ok(None);
        };
        if request.id != ticket.transition || request.step != ticket.step {
            self.log(LogLevel::Debug, "stale_signal", Self::ticket_fields(&ticket, ""));
            return Ok(None);
        }
        let panel = request
            .participant(ticket.role)
            .map(|handle| handle.name().to_string())
            .unwrap_or_default();

        match signal.kind {
            SignalKind::Abandoned => {
                request.stalled = true;
                let fields = Self::ticket_fields(&ticket, &panel);
                self.log(LogLevel::Error, "completion_abandoned", fields.clone());
                self.audit(TransitionAuditStage::CompletionAbandoned, fields);
                self.record_metric(TransitionMetrics::record_stall);
                Err(PanelError::StalledTransition {
                    transition: ticket.transition.get(),
                    panel,
                    stage: ticket.stage.to_string(),
                })
            }
            SignalKind::Completed => {
                request.step += 1;
                let done = request.current_step().is_none();
                self.audit(
                    TransitionAuditStage::StageCompleted,
                    Self::ticket_fields(&ticket, &panel),
                );
                self.record_metric(TransitionMetrics::record_stage_completed);
                if !done {
                    self.dispatch_current()?;
                    return Ok(None);
                }
                match self.in_flight.take() {
                    Some(request) => Ok(Some(self.finish(request))),
                    None => Ok(None),
                }
            }
        }
    }

    fn finish(&mut self, request: TransitionRequest) -> TransitionId {
        self.release_lock(request.id);

        let fields = [
            json_kv("transition", request.id.get()),
            json_kv("kind", request.kind.as_str()),
            json_kv("target", request.target.name()),
        ];
        self.log(LogLevel::Info, "transition_finished", fields.clone());
        self.record_metric(TransitionMetrics::record_finished);

        if let Some(on_finished) = request.on_finished {
            on_finished();
        }
        self.audit(TransitionAuditStage::TransitionFinished, fields);
        request.id
    }

    /// Drop the in-flight transition without running its callback.
    fn abort_in_flight(&mut self, ticket: &StageTicket, panel: &str) {
        if let Some(request) = self.in_flight.take() {
            self.release_lock(request.id);
            self.log(
                LogLevel::Error,
                "transition_aborted",
                Self::ticket_fields(ticket, panel),
            );
        }
    }

    fn engage_lock(&mut self, id: TransitionId) {
        self.lock.engage();
        if let Some(dispatch) = self.dispatch.as_mut() {
            dispatch.set_enabled(false);
        }
        self.audit(
            TransitionAuditStage::LockEngaged,
            [json_kv("transition", id.get())],
        );
    }

    fn release_lock(&mut self, id: TransitionId) {
        self.lock.release();
        if let Some(dispatch) = self.dispatch.as_mut() {
            dispatch.set_enabled(true);
        }
        self.audit(
            TransitionAuditStage::LockReleased,
            [json_kv("transition", id.get())],
        );
    }

    fn status_after(&self, finished: Option<TransitionId>) -> TransitionStatus {
        match (self.in_flight.as_ref(), finished) {
            (Some(request), _) => TransitionStatus::Pending(request.id),
            (None, Some(id)) => TransitionStatus::Finished(id),
            (None, None) => TransitionStatus::Idle,
        }
    }

    fn ticket_fields(ticket: &StageTicket, panel: &str) -> Vec<(String, Value)> {
        vec![
            json_kv("transition", ticket.transition.get()),
            json_kv("step", ticket.step as u64),
            json_kv(
                "role",
                match ticket.role {
                    Role::Sender => "sender",
                    Role::Target => "target",
                },
            ),
            json_kv("stage", ticket.stage.as_str()),
            json_kv("panel", json!(panel)),
        ]
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, STACK_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    fn audit<I>(&self, stage: TransitionAuditStage, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(audit) = self.config.audit.as_ref() {
            let mut builder = TransitionAuditEventBuilder::new(stage);
            for (key, value) in fields {
                builder.detail(key, value);
            }
            audit.record(builder.finish());
        }
    }

    fn record_metric(&self, record: fn(&mut TransitionMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }
}
