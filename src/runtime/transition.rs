//! Transition kinds and the fixed stage plans they run.
//!
//! Every transition is one of three kinds. Each kind maps to a static list of
//! steps; a step names the participant ([`Role`]) and the lifecycle [`Stage`]
//! that must signal completion before the next step may begin.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

use crate::panel::PanelHandle;

/// Callback invoked once a transition has fully completed.
pub type OnFinished = Box<dyn FnOnce() + Send>;

/// Identifier assigned to each accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransitionId(pub(crate) u64);

impl TransitionId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Sender disappears, then target appears.
    Present,
    /// Target appears with nothing to leave.
    PresentWithoutSender,
    /// Target disappears; nothing appears.
    Hide,
}

impl TransitionKind {
    pub fn plan(self) -> &'static [Step] {
        match self {
            TransitionKind::Present => &PRESENT_PLAN,
            TransitionKind::PresentWithoutSender => &PRESENT_PLAN[3..],
            TransitionKind::Hide => &HIDE_PLAN,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::Present => "present",
            TransitionKind::PresentWithoutSender => "present_target",
            TransitionKind::Hide => "hide_target",
        }
    }
}

/// Participant a step addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sender,
    Target,
}

/// Lifecycle stage awaiting an explicit completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    WillDisappear,
    DisappearAnimation,
    DidDisappear,
    WillAppear,
    AppearAnimation,
    DidAppear,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::WillDisappear => "will_disappear",
            Stage::DisappearAnimation => "disappear_animation",
            Stage::DidDisappear => "did_disappear",
            Stage::WillAppear => "will_appear",
            Stage::AppearAnimation => "appear_animation",
            Stage::DidAppear => "did_appear",
        }
    }

    pub fn is_appearing(self) -> bool {
        matches!(
            self,
            Stage::WillAppear | Stage::AppearAnimation | Stage::DidAppear
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub role: Role,
    pub stage: Stage,
}

const fn step(role: Role, stage: Stage) -> Step {
    Step { role, stage }
}

static PRESENT_PLAN: [Step; 6] = [
    step(Role::Sender, Stage::WillDisappear),
    step(Role::Sender, Stage::DisappearAnimation),
    step(Role::Sender, Stage::DidDisappear),
    step(Role::Target, Stage::WillAppear),
    step(Role::Target, Stage::AppearAnimation),
    step(Role::Target, Stage::DidAppear),
];

static HIDE_PLAN: [Step; 3] = [
    step(Role::Target, Stage::WillDisappear),
    step(Role::Target, Stage::DisappearAnimation),
    step(Role::Target, Stage::DidDisappear),
];

/// Outcome of an entry operation or a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    /// No transition is in flight and none finished during the call.
    Idle,
    /// The transition is waiting on a completion signal.
    Pending(TransitionId),
    /// The transition ran to completion during the call.
    Finished(TransitionId),
}

impl TransitionStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, TransitionStatus::Finished(_))
    }
}

/// Read-only view of the in-flight transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub role: Role,
    pub stage: Stage,
    pub panel: String,
    pub stalled: bool,
}

/// In-flight transition owned exclusively by the orchestrator.
pub(crate) struct TransitionRequest {
    pub(crate) id: TransitionId,
    pub(crate) kind: TransitionKind,
    pub(crate) sender: Option<PanelHandle>,
    pub(crate) target: PanelHandle,
    pub(crate) on_finished: Option<OnFinished>,
    pub(crate) step: usize,
    pub(crate) stage_started: Instant,
    pub(crate) stalled: bool,
}

impl TransitionRequest {
    pub(crate) fn new(
        id: TransitionId,
        kind: TransitionKind,
        sender: Option<PanelHandle>,
        target: PanelHandle,
        on_finished: Option<OnFinished>,
    ) -> Self {
        Self {
            id,
            kind,
            sender,
            target,
            on_finished,
            step: 0,
            stage_started: Instant::now(),
            stalled: false,
        }
    }

    pub(crate) fn current_step(&self) -> Option<Step> {
        self.kind.plan().get(self.step).copied()
    }

    pub(crate) fn participant(&self, role: Role) -> Option<&PanelHandle> {
        match role {
            Role::Sender => self.sender.as_ref(),
            Role::Target => Some(&self.target),
        }
    }

    pub(crate) fn snapshot(&self) -> Option<InFlight> {
        let step = self.current_step()?;
        let panel = self.participant(step.role)?.name().to_string();
        Some(InFlight {
            id: self.id,
            kind: self.kind,
            role: step.role,
            stage: step.stage,
            panel,
            stalled: self.stalled,
        })
    }
}
