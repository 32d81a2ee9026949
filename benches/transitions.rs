use criterion::{Criterion, black_box, criterion_group, criterion_main};
use panel_stack::logging::{LogEvent, LogSink};
use panel_stack::{
    Completion, LifecycleLoggerAudit, Logger, LoggingResult, Panel, PanelHandle, PanelLifecycle,
    PanelRegistry, Result, StackConfig, StackSettings, TransitionStack, shared,
};
use std::sync::Arc;

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

/// Panel whose hooks and animations all finish inline.
struct InstantPanel {
    name: String,
    lifecycle: PanelLifecycle,
}

impl InstantPanel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lifecycle: PanelLifecycle::new(),
        }
    }
}

impl Panel for InstantPanel {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifecycle(&self) -> &PanelLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut PanelLifecycle {
        &mut self.lifecycle
    }

    fn will_disappear(&mut self, on_done: Completion) {
        on_done.complete();
    }

    fn did_disappear(&mut self, on_done: Completion) {
        on_done.complete();
    }

    fn will_appear(&mut self, _sender: Option<&PanelHandle>, on_done: Completion) {
        on_done.complete();
    }

    fn did_appear(&mut self, _sender: Option<&PanelHandle>, on_done: Completion) {
        on_done.complete();
    }

    fn start_appear_animation(&mut self) {
        self.on_animation_finished();
    }

    fn start_disappear_animation(&mut self) {
        self.on_animation_finished();
    }
}

const PANELS: [&str; 4] = ["MainMenuPanel", "SettingsPanel", "ShopPanel", "GameScenePanel"];

fn build_stack(instrumented: bool) -> Result<TransitionStack> {
    let registry = PanelRegistry::build(PANELS.iter().map(|name| shared(InstantPanel::new(name))))?;
    let mut config = StackConfig::with_settings(StackSettings::default());
    if instrumented {
        let logger = Logger::new(NullSink);
        config.logger = Some(logger.clone());
        config.audit = Some(Arc::new(LifecycleLoggerAudit::new(logger)));
        config.enable_metrics();
    }
    TransitionStack::new(registry, config)
}

fn present_round_trip(c: &mut Criterion) {
    c.bench_function("present_round_trip", |b| {
        let mut stack = build_stack(false).expect("stack");
        b.iter(|| {
            stack
                .present(black_box("SettingsPanel"), "MainMenuPanel", None)
                .expect("forward");
            stack
                .present(black_box("MainMenuPanel"), "SettingsPanel", None)
                .expect("back");
        });
    });
}

fn present_round_trip_instrumented(c: &mut Criterion) {
    c.bench_function("present_round_trip_instrumented", |b| {
        let mut stack = build_stack(true).expect("stack");
        b.iter(|| {
            stack
                .present(black_box("ShopPanel"), "MainMenuPanel", None)
                .expect("forward");
            stack
                .present(black_box("MainMenuPanel"), "ShopPanel", None)
                .expect("back");
        });
    });
}

fn toggle_active_set(c: &mut Criterion) {
    c.bench_function("toggle_active_set", |b| {
        let mut stack = build_stack(false).expect("stack");
        b.iter(|| {
            black_box(stack.deactivate_all().expect("deactivate"));
            black_box(stack.activate_all().expect("activate"));
        });
    });
}

criterion_group!(
    benches,
    present_round_trip,
    present_round_trip_instrumented,
    toggle_active_set
);
criterion_main!(benches);
