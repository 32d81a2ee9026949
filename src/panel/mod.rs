//! Panel lifecycle contract.
//!
//! A panel is one screen of the UI, presented exclusively of its siblings.
//! The orchestrator drives it through `will_*` / `did_*` hooks and animation
//! runs, and every call carries a [`Completion`] the panel must complete
//! exactly once, either inline or after arbitrarily delayed work.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{PanelError, Result};
use crate::runtime::signal::Completion;

mod lifecycle;

pub use lifecycle::{PanelLifecycle, PanelPhase};

/// Panels are shared between the registry, the orchestrator and whatever
/// drives their animations.
pub type SharedPanel = Arc<Mutex<dyn Panel>>;

/// Contract implemented by every screen panel.
pub trait Panel: Send {
    /// Stable, unique key used by the registry.
    fn name(&self) -> &str;

    fn lifecycle(&self) -> &PanelLifecycle;

    fn lifecycle_mut(&mut self) -> &mut PanelLifecycle;

    fn will_disappear(&mut self, on_done: Completion);

    fn did_disappear(&mut self, on_done: Completion);

    /// `sender` is the panel being left, or `None` for a standalone
    /// presentation. A panel presented from itself also sees `None`, since
    /// its own mutex is held for the duration of the hook.
    fn will_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion);

    fn did_appear(&mut self, sender: Option<&PanelHandle>, on_done: Completion);

    /// Kick off the visual appear transition. Must eventually lead to one
    /// [`Panel::on_animation_finished`] call.
    fn start_appear_animation(&mut self);

    /// Kick off the visual disappear transition.
    fn start_disappear_animation(&mut self);

    fn run_appear_animation(&mut self, on_done: Completion) {
        self.lifecycle_mut().arm_appear(on_done);
        self.start_appear_animation();
    }

    fn run_disappear_animation(&mut self, on_done: Completion) {
        self.lifecycle_mut().arm_disappear(on_done);
        self.start_disappear_animation();
    }

    /// Signal that the running animation has finished.
    fn on_animation_finished(&mut self) {
        self.lifecycle_mut().finish_animation();
    }

    fn on_appear_animation_finished(&mut self) {
        self.lifecycle_mut().finish_appear();
    }

    fn on_disappear_animation_finished(&mut self) {
        self.lifecycle_mut().finish_disappear();
    }

    fn is_presented(&self) -> bool {
        self.lifecycle().is_presented()
    }

    fn phase(&self) -> PanelPhase {
        self.lifecycle().phase()
    }

    /// Toggle whether the panel is live (drawn and updated). Override to hook
    /// the visual layer; keep calling through to the lifecycle flag.
    fn set_active(&mut self, active: bool) {
        self.lifecycle_mut().set_active(active);
    }

    fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }
}

/// Name-carrying reference to a shared panel.
#[derive(Clone)]
pub struct PanelHandle {
    name: Arc<str>,
    panel: SharedPanel,
}

impl PanelHandle {
    /// Reads the panel's name once and caches it.
    pub fn new(panel: SharedPanel) -> Result<Self> {
        let name: Arc<str> = {
            let guard = panel
                .lock()
                .map_err(|_| PanelError::Poisoned("<unnamed>".to_string()))?;
            Arc::from(guard.name())
        };
        Ok(Self { name, panel })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn panel(&self) -> &SharedPanel {
        &self.panel
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, dyn Panel + 'static>> {
        self.panel
            .lock()
            .map_err(|_| PanelError::Poisoned(self.name.to_string()))
    }

    pub fn is_presented(&self) -> Result<bool> {
        Ok(self.lock()?.is_presented())
    }

    pub fn phase(&self) -> Result<PanelPhase> {
        Ok(self.lock()?.phase())
    }

    pub fn same_panel(&self, other: &PanelHandle) -> bool {
        Arc::ptr_eq(&self.panel, &other.panel)
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandle")
            .field("name", &self.name)
            .finish()
    }
}

/// A discovered object that may or may not qualify as a panel.
#[derive(Clone)]
pub struct PanelCandidate {
    pub tag: String,
    pub panel: SharedPanel,
}

impl PanelCandidate {
    pub fn new(tag: impl Into<String>, panel: SharedPanel) -> Self {
        Self {
            tag: tag.into(),
            panel,
        }
    }
}

/// Wrap a concrete panel for registration.
pub fn shared<P>(panel: P) -> SharedPanel
where
    P: Panel + 'static,
{
    Arc::new(Mutex::new(panel))
}
