use serde::Serialize;

use crate::runtime::signal::Completion;

/// Presentation phase of a single panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelPhase {
    Hidden,
    Appearing,
    Presented,
    Disappearing,
}

/// Per-panel state driven by the lifecycle contract.
///
/// Concrete panels embed one of these and expose it through
/// [`Panel::lifecycle`](super::Panel::lifecycle); the default animation
/// methods on the trait do the bookkeeping.
#[derive(Debug)]
pub struct PanelLifecycle {
    phase: PanelPhase,
    presented: bool,
    active: bool,
    appear_handler: Option<Completion>,
    disappear_handler: Option<Completion>,
}

impl Default for PanelLifecycle {
    fn default() -> Self {
        Self {
            phase: PanelPhase::Hidden,
            presented: false,
            active: true,
            appear_handler: None,
            disappear_handler: None,
        }
    }
}

impl PanelLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// True while an animation handler is armed and waiting.
    pub fn animation_pending(&self) -> bool {
        self.appear_handler.is_some() || self.disappear_handler.is_some()
    }

    pub(crate) fn restore_presented(&mut self) {
        self.phase = PanelPhase::Presented;
        self.presented = true;
    }

    pub(crate) fn arm_appear(&mut self, on_done: Completion) {
        self.appear_handler = Some(on_done);
        self.phase = PanelPhase::Appearing;
    }

    pub(crate) fn arm_disappear(&mut self, on_done: Completion) {
        self.disappear_handler = Some(on_done);
        self.phase = PanelPhase::Disappearing;
    }

    pub(crate) fn finish_appear(&mut self) {
        if let Some(handler) = self.appear_handler.take() {
            handler.complete();
        }
        self.presented = true;
        self.phase = PanelPhase::Presented;
    }

    pub(crate) fn finish_disappear(&mut self) {
        if let Some(handler) = self.disappear_handler.take() {
            handler.complete();
        }
        self.presented = false;
        self.phase = PanelPhase::Hidden;
    }

    /// Finish whichever animation is running. Returns false when neither an
    /// appear nor a disappear animation is in progress.
    pub(crate) fn finish_animation(&mut self) -> bool {
        match self.phase {
            PanelPhase::Appearing => {
                self.finish_appear();
                true
            }
            PanelPhase::Disappearing => {
                self.finish_disappear();
                true
            }
            PanelPhase::Hidden | PanelPhase::Presented => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::signal::{SignalKind, test_completion};
    use crate::runtime::transition::Stage;

    #[test]
    fn appear_cycle_completes_handler_once() {
        let mut lifecycle = PanelLifecycle::new();
        let (completion, queue) = test_completion(Stage::AppearAnimation);

        lifecycle.arm_appear(completion);
        assert_eq!(lifecycle.phase(), PanelPhase::Appearing);
        assert!(!lifecycle.is_presented());
        assert!(lifecycle.animation_pending());

        assert!(lifecycle.finish_animation());
        assert!(lifecycle.is_presented());
        assert_eq!(lifecycle.phase(), PanelPhase::Presented);
        assert_eq!(queue.pop().map(|s| s.kind), Some(SignalKind::Completed));

        assert!(!lifecycle.finish_animation());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn disappear_clears_presented() {
        let mut lifecycle = PanelLifecycle::new();
        lifecycle.restore_presented();
        let (completion, queue) = test_completion(Stage::DisappearAnimation);

        lifecycle.arm_disappear(completion);
        assert!(lifecycle.is_presented());
        lifecycle.finish_disappear();

        assert!(!lifecycle.is_presented());
        assert_eq!(lifecycle.phase(), PanelPhase::Hidden);
        assert_eq!(queue.len(), 1);
    }
}
