//! One-shot completion handles and the queue they report into.
//!
//! Hooks receive a [`Completion`] and must eventually call
//! [`Completion::complete`]. Completing consumes the handle, so a stage can be
//! resumed at most once. A handle dropped without completing posts an
//! abandoned signal instead, which the orchestrator reports as a stall.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::transition::{Role, Stage, TransitionId};

/// Identifies the stage a [`Completion`] resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StageTicket {
    pub transition: TransitionId,
    pub step: usize,
    pub role: Role,
    pub stage: Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalKind {
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Signal {
    pub(crate) ticket: StageTicket,
    pub(crate) kind: SignalKind,
}

#[derive(Clone, Default)]
pub(crate) struct SignalQueue {
    inner: Arc<Mutex<VecDeque<Signal>>>,
}

impl SignalQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, signal: Signal) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push_back(signal);
        }
    }

    pub(crate) fn pop(&self) -> Option<Signal> {
        self.inner.lock().ok().and_then(|mut guard| guard.pop_front())
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

/// Completion handle handed to every lifecycle hook and animation.
pub struct Completion {
    ticket: StageTicket,
    queue: Option<SignalQueue>,
}

impl Completion {
    pub(crate) fn new(ticket: StageTicket, queue: SignalQueue) -> Self {
        Self {
            ticket,
            queue: Some(queue),
        }
    }

    /// Resume the orchestrator. Safe to call from inside the hook or later,
    /// from any thread.
    pub fn complete(mut self) {
        if let Some(queue) = self.queue.take() {
            queue.push(Signal {
                ticket: self.ticket,
                kind: SignalKind::Completed,
            });
        }
    }

    pub fn ticket(&self) -> StageTicket {
        self.ticket
    }

    pub fn stage(&self) -> Stage {
        self.ticket.stage
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.push(Signal {
                ticket: self.ticket,
                kind: SignalKind::Abandoned,
            });
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("ticket", &self.ticket)
            .field("pending", &self.queue.is_some())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_completion(stage: Stage) -> (Completion, SignalQueue) {
    let queue = SignalQueue::new();
    let ticket = StageTicket {
        transition: TransitionId(0),
        step: 0,
        role: Role::Target,
        stage,
    };
    (Completion::new(ticket, queue.clone()), queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_posts_exactly_one_signal() {
        let (completion, queue) = test_completion(Stage::WillAppear);
        completion.complete();
        let signal = queue.pop().expect("signal");
        assert_eq!(signal.kind, SignalKind::Completed);
        assert_eq!(signal.ticket.stage, Stage::WillAppear);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn dropping_unfired_completion_reports_abandoned() {
        let (completion, queue) = test_completion(Stage::DidDisappear);
        drop(completion);
        let signal = queue.pop().expect("signal");
        assert_eq!(signal.kind, SignalKind::Abandoned);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn completion_can_cross_threads() {
        let (completion, queue) = test_completion(Stage::AppearAnimation);
        std::thread::spawn(move || completion.complete())
            .join()
            .unwrap();
        assert_eq!(queue.pop().map(|s| s.kind), Some(SignalKind::Completed));
    }
}
