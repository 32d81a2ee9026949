//! Scripted panels shared by the unit tests.

use std::sync::{Arc, Mutex};

use crate::panel::{Panel, PanelHandle, PanelLifecycle, SharedPanel, shared};
use crate::runtime::input::InputLock;
use crate::runtime::signal::Completion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HookRecord {
    pub panel: String,
    pub hook: &'static str,
    pub sender: Option<String>,
    /// Whether the sender's mutex could be taken from inside the hook.
    pub sender_free: Option<bool>,
    pub locked: Option<bool>,
}

/// Ordered record of every hook call across all panels sharing it.
#[derive(Clone, Default)]
pub(crate) struct HookLog {
    entries: Arc<Mutex<Vec<HookRecord>>>,
}

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: HookRecord) {
        self.entries.lock().unwrap().push(record);
    }

    pub fn records(&self) -> Vec<HookRecord> {
        self.entries.lock().unwrap().clone()
    }

    /// `"Panel.hook"` strings in call order.
    pub fn hooks(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|record| format!("{}.{}", record.panel, record.hook))
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Completions a deferred panel is holding on to.
#[derive(Clone, Default)]
pub(crate) struct Parked {
    inner: Arc<Mutex<Vec<Completion>>>,
}

impl Parked {
    fn park(&self, completion: Completion) {
        self.inner.lock().unwrap().push(completion);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Complete the oldest parked completion; false when none is parked.
    pub fn release_next(&self) -> bool {
        let next = {
            let mut guard = self.inner.lock().unwrap();
            if guard.is_empty() {
                None
            } else {
                Some(guard.remove(0))
            }
        };
        match next {
            Some(completion) => {
                completion.complete();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Every hook and animation completes inline.
    Immediate,
    /// Hooks park their completion; animations wait for an explicit finish.
    Deferred,
}

pub(crate) struct ScriptedPanel {
    name: String,
    lifecycle: PanelLifecycle,
    log: HookLog,
    mode: Mode,
    parked: Parked,
    lock: Option<InputLock>,
    abandon_at: Option<&'static str>,
}

impl ScriptedPanel {
    pub fn immediate(name: &str, log: HookLog) -> Self {
        Self::new(name, log, Mode::Immediate)
    }

    pub fn deferred(name: &str, log: HookLog) -> Self {
        Self::new(name, log, Mode::Deferred)
    }

    fn new(name: &str, log: HookLog, mode: Mode) -> Self {
        Self {
            name: name.to_string(),
            lifecycle: PanelLifecycle::new(),
            log,
            mode,
            parked: Parked::default(),
            lock: None,
            abandon_at: None,
        }
    }

    /// Record the input lock state alongside every hook.
    pub fn observing(mut self, lock: InputLock) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Drop the completion handed to `hook` instead of completing it.
    pub fn abandoning(mut self, hook: &'static str) -> Self {
        self.abandon_at = Some(hook);
        self
    }

    pub fn parked(&self) -> Parked {
        self.parked.clone()
    }

    pub fn into_shared(self) -> SharedPanel {
        shared(self)
    }

    fn record(&self, hook: &'static str, sender: Option<&PanelHandle>) {
        self.log.push(HookRecord {
            panel: self.name.clone(),
            hook,
            sender: sender.map(|handle| handle.name().to_string()),
            sender_free: sender.map(|handle| handle.panel().try_lock().is_ok()),
            locked: self.lock.as_ref().map(InputLock::is_engaged),
        });
    }

    fn settle(&self, hook: &'static str, on_done: Completion) {
        if self.abandon_at == Some(hook) {
            drop(on_done);
            return;
        }
        match self.mode {
            Mode::Immediate => on_done.complete(),
            Mode::Deferred => self.parked.park(on_done),
        }
    }
}

impl Panel for ScriptedPanel {
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
        self.record("will_disappear", None);
        self.settle("will_disappear", on_done);
    }

    fn did_disappear(&mut self, on_done: Completion) {
        self.record("did_disappear", None);
        self.settle("did_disappear", on_done);
    }

    fn will_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion) {
        self.record("will_appear", sender);
        self.settle("will_appear", on_done);
    }

    fn did_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion) {
        self.record("did_appear", sender);
        self.settle("did_appear", on_done);
    }

    fn start_appear_animation(&mut self) {
        self.record("appear_animation", None);
        if self.mode == Mode::Immediate {
            self.on_animation_finished();
        }
    }

    fn start_disappear_animation(&mut self) {
        self.record("disappear_animation", None);
        if self.mode == Mode::Immediate {
            self.on_animation_finished();
        }
    }
}
