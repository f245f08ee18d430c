//! Shared bootstrap state.
//!
//! Only the control task advances `attempt_index`. `running` and the active
//! instance are the synchronization surface shared with the status publisher.

use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::lifecycle::instance::ServerInstance;

/// Where a bootstrap run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Nothing attempted yet.
    Idle = 0,
    /// A bind attempt is in flight.
    AttemptingBind = 1,
    /// Bound and serving; the control task is parked.
    Serving = 2,
    /// Terminal for this run.
    Stopped = 3,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::AttemptingBind,
            2 => Phase::Serving,
            3 => Phase::Stopped,
            _ => Phase::Idle,
        }
    }
}

/// State of one bootstrap run.
///
/// `running == true` implies an active instance is present and the attempt
/// index no longer moves.
#[derive(Debug)]
pub struct BootstrapState {
    attempt_index: AtomicIsize,
    running: AtomicBool,
    phase: AtomicU8,
    instance: ArcSwapOption<ServerInstance>,
}

impl BootstrapState {
    pub fn new() -> Self {
        Self {
            attempt_index: AtomicIsize::new(-1),
            running: AtomicBool::new(false),
            phase: AtomicU8::new(Phase::Idle as u8),
            instance: ArcSwapOption::empty(),
        }
    }

    /// Index of the current (or last) candidate, `None` before the first attempt.
    pub fn attempt_index(&self) -> Option<usize> {
        usize::try_from(self.attempt_index.load(Ordering::SeqCst)).ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// The bound server, if any.
    pub fn active_instance(&self) -> Option<Arc<ServerInstance>> {
        self.instance.load_full()
    }

    /// Move to the next candidate. Returns its index, or `None` (and enters
    /// `Stopped`) when the list of `len` candidates is exhausted.
    pub(crate) fn advance(&self, len: usize) -> Option<usize> {
        let next = self.attempt_index.load(Ordering::SeqCst) + 1;
        match usize::try_from(next) {
            Ok(index) if index < len => {
                self.attempt_index.store(next, Ordering::SeqCst);
                self.set_phase(Phase::AttemptingBind);
                Some(index)
            }
            _ => {
                self.set_phase(Phase::Stopped);
                None
            }
        }
    }

    /// Publish the bound instance, then flip `running`.
    pub(crate) fn activate(&self, instance: Arc<ServerInstance>) {
        self.instance.store(Some(instance));
        self.running.store(true, Ordering::SeqCst);
        self.set_phase(Phase::Serving);
    }

    pub(crate) fn mark_stopped(&self) {
        self.set_phase(Phase::Stopped);
    }

    /// Back to `Idle` for a restart from the first candidate.
    pub(crate) fn reset(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.instance.store(None);
        self.attempt_index.store(-1, Ordering::SeqCst);
        self.set_phase(Phase::Idle);
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }
}

impl Default for BootstrapState {
    fn default() -> Self {
        Self::new()
    }
}
