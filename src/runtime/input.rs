use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossterm::event::Event;

/// Boundary to the host's input system, toggled in lock-step with the
/// [`InputLock`].
pub trait InputDispatch: Send {
    fn set_enabled(&mut self, enabled: bool);
}

/// Gate held for the whole duration of a transition.
///
/// Clones share the same flag, so any part of the application can observe
/// whether input is currently locked.
#[derive(Clone, Default)]
pub struct InputLock {
    engaged: Arc<AtomicBool>,
}

impl InputLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engage(&self) {
        self.engaged.store(true, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.engaged.store(false, Ordering::SeqCst);
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::SeqCst)
    }

    /// Event filter bound to this lock.
    pub fn gate(&self) -> InputGate {
        InputGate::new(self.clone())
    }
}

/// Drops terminal events while the lock is engaged.
pub struct InputGate {
    lock: InputLock,
    dropped: AtomicU64,
}

impl InputGate {
    pub fn new(lock: InputLock) -> Self {
        Self {
            lock,
            dropped: AtomicU64::new(0),
        }
    }

    /// Pass `event` through unless a transition holds the lock.
    ///
    /// Resize events always pass; the host still needs to track terminal
    /// geometry mid-transition.
    pub fn filter(&self, event: Event) -> Option<Event> {
        if !self.lock.is_engaged() || matches!(event, Event::Resize(_, _)) {
            return Some(event);
        }
        self.dropped.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn lock(&self) -> &InputLock {
        &self.lock
    }
}
