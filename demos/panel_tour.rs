//! Walks three panels through a scripted tour with multi-frame animations.
//!
//! Run with `cargo run --example panel_tour`.

use std::sync::{Arc, Mutex};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use panel_stack::{
    Completion, LifecycleLoggerAudit, LogLevel, Logger, MemorySink, Panel, PanelHandle,
    PanelLifecycle, PanelRegistry, SharedPanel, StackConfig, StackSettings, TransitionStack,
    TransitionStatus,
};

const ANIMATION_FRAMES: u8 = 3;

/// Panel whose animations take a few frames to play out.
struct TourPanel {
    name: String,
    lifecycle: PanelLifecycle,
    frames_left: Option<u8>,
}

impl TourPanel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            lifecycle: PanelLifecycle::new(),
            frames_left: None,
        }
    }

    fn tick(&mut self) {
        match self.frames_left {
            Some(0) => {
                self.frames_left = None;
                self.on_animation_finished();
            }
            Some(left) => self.frames_left = Some(left - 1),
            None => {}
        }
    }
}

impl Panel for TourPanel {
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
        println!("  {} will disappear", self.name);
        on_done.complete();
    }

    fn did_disappear(&mut self, on_done: Completion) {
        println!("  {} did disappear", self.name);
        on_done.complete();
    }

    fn will_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion) {
        let sender = sender.map(PanelHandle::name).unwrap_or("-");
        println!("  {} will appear (sender: {sender})", self.name);
        on_done.complete();
    }

    fn did_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion) {
        let sender = sender.map(PanelHandle::name).unwrap_or("-");
        println!("  {} did appear (sender: {sender})", self.name);
        on_done.complete();
    }

    fn start_appear_animation(&mut self) {
        self.frames_left = Some(ANIMATION_FRAMES);
    }

    fn start_disappear_animation(&mut self) {
        self.frames_left = Some(ANIMATION_FRAMES);
    }
}

fn run_until_idle(
    stack: &mut TransitionStack,
    panels: &[Arc<Mutex<TourPanel>>],
    status: TransitionStatus,
) -> panel_stack::Result<()> {
    let gate = stack.input_lock().gate();
    let mut status = status;
    let mut frame = 0;
    while let TransitionStatus::Pending(_) = status {
        frame += 1;
        let key = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        if gate.filter(key).is_none() {
            println!("  frame {frame}: input dropped, transition in progress");
        }
        for panel in panels {
            if let Ok(mut guard) = panel.lock() {
                guard.tick();
            }
        }
        status = stack.pump()?;
    }
    Ok(())
}

fn main() -> panel_stack::Result<()> {
    let names = ["MainMenuPanel", "SettingsPanel", "GameScenePanel"];
    let panels: Vec<Arc<Mutex<TourPanel>>> = names
        .iter()
        .map(|name| Arc::new(Mutex::new(TourPanel::new(name))))
        .collect();
    let shared: Vec<SharedPanel> = panels
        .iter()
        .map(|panel| -> SharedPanel { panel.clone() })
        .collect();

    let sink = MemorySink::new();
    let logger = Logger::new(sink.clone()).with_min_level(LogLevel::Info);
    let mut config = StackConfig::with_settings(StackSettings::default());
    config.logger = Some(logger.clone());
    config.audit = Some(Arc::new(
        LifecycleLoggerAudit::new(logger).with_level(LogLevel::Info).log_stages(false),
    ));
    config.enable_metrics();

    let mut stack = TransitionStack::new(PanelRegistry::build(shared)?, config)?;

    println!("present SettingsPanel from MainMenuPanel");
    let status = stack.present(
        "SettingsPanel",
        "MainMenuPanel",
        Some(Box::new(|| println!("  -> settings ready"))),
    )?;
    run_until_idle(&mut stack, &panels, status)?;

    println!("present GameScenePanel standalone");
    let status = stack.present_target("GameScenePanel", None)?;
    run_until_idle(&mut stack, &panels, status)?;

    println!("hide SettingsPanel");
    let status = stack.hide_target("SettingsPanel", None)?;
    run_until_idle(&mut stack, &panels, status)?;

    println!("backgrounding: deactivated {} panels", stack.deactivate_all()?);

    match stack.present("Missing", "MainMenuPanel", None) {
        Err(err) => println!("expected failure: {err}"),
        Ok(status) => println!("unexpected status: {status:?}"),
    }

    stack.emit_metrics();
    println!("\nlog:");
    for line in sink.json_lines().unwrap_or_default() {
        println!("{line}");
    }
    Ok(())
}
