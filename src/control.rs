use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use sat_portfolio_core::solver::InterruptSignal;

#[derive(Debug, Default)]
struct Signals {
    members: Vec<InterruptSignal>,
    /// Set once a race has a winner. Until the next race starts, the losers' cancellation
    /// must survive [ControlHandle::clear_interrupt].
    decided: bool,
}

#[derive(Debug, Default)]
struct ControlState {
    interrupted: AtomicBool,
    signals: Mutex<Signals>,
}

/// Interrupt/resume switch of a session, usable from any thread while a race is running.
///
/// Only flags are touched here, never the result slot of a race.
#[derive(Debug, Clone, Default)]
pub struct ControlHandle(Arc<ControlState>);

impl ControlHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn signals(&self) -> MutexGuard<'_, Signals> {
        self.0.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask every member to stop. Returns immediately.
    pub fn interrupt(&self) {
        debug!("Interrupt requested");
        let guard = self.signals();
        self.0.interrupted.store(true, Ordering::SeqCst);
        for signal in guard.members.iter() {
            signal.raise();
        }
    }

    /// Lift the interrupt. Members cancelled by a decided race stay cancelled.
    pub fn clear_interrupt(&self) {
        debug!("Interrupt cleared");
        let guard = self.signals();
        self.0.interrupted.store(false, Ordering::SeqCst);
        if guard.decided {
            return;
        }
        for signal in guard.members.iter() {
            signal.lower();
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.interrupted.load(Ordering::SeqCst)
    }

    /// Replace the set of member signals, e.g. after the pool was rebuilt.
    pub(crate) fn register(&self, signals: Vec<InterruptSignal>) {
        let mut guard = self.signals();
        let interrupted = self.is_interrupted();
        for signal in signals.iter() {
            signal.set(interrupted);
        }
        guard.members = signals;
        guard.decided = false;
    }

    /// Bring every member signal in line with the session flag before a race.
    /// Lowers the cancellations a previous race left behind.
    pub(crate) fn sync(&self) {
        let mut guard = self.signals();
        guard.decided = false;
        let interrupted = self.is_interrupted();
        for signal in guard.members.iter() {
            signal.set(interrupted);
        }
    }

    /// Stop every member except the race winner.
    pub(crate) fn cancel_losers(&self, winner: usize) {
        let mut guard = self.signals();
        guard.decided = true;
        for (index, signal) in guard.members.iter().enumerate() {
            if index != winner {
                signal.raise();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_interrupt_reaches_registered_signals() {
        let control = ControlHandle::new();
        let signals = vec![InterruptSignal::new(), InterruptSignal::new()];
        control.register(signals.clone());

        control.interrupt();
        assert!(control.is_interrupted());
        assert!(signals.iter().all(|s| s.is_raised()));

        control.clear_interrupt();
        assert!(!control.is_interrupted());
        assert!(signals.iter().all(|s| !s.is_raised()));
    }

    #[test]
    fn test_sync_lowers_stale_signals() {
        let control = ControlHandle::new();
        let signals = vec![InterruptSignal::new(), InterruptSignal::new()];
        control.register(signals.clone());
        signals[1].raise();
        control.sync();
        assert!(!signals[1].is_raised());

        control.interrupt();
        signals[0].lower();
        control.sync();
        assert!(signals[0].is_raised());
    }

    #[test]
    fn test_register_applies_current_flag() {
        let control = ControlHandle::new();
        control.interrupt();
        let signal = InterruptSignal::new();
        control.register(vec![signal.clone()]);
        assert!(signal.is_raised());
    }

    #[test]
    fn test_clear_keeps_losers_cancelled() {
        let control = ControlHandle::new();
        let signals = vec![InterruptSignal::new(), InterruptSignal::new(), InterruptSignal::new()];
        control.register(signals.clone());

        control.cancel_losers(1);
        assert!(signals[0].is_raised());
        assert!(!signals[1].is_raised());
        assert!(signals[2].is_raised());

        control.interrupt();
        control.clear_interrupt();
        assert!(!control.is_interrupted());
        assert!(signals[0].is_raised());
        assert!(signals[2].is_raised());

        // The next race starts from a clean slate:
        control.sync();
        assert!(signals.iter().all(|s| !s.is_raised()));
        control.interrupt();
        control.clear_interrupt();
        assert!(signals.iter().all(|s| !s.is_raised()));
    }

    #[test]
    fn test_handle_is_shared_across_threads() {
        let control = ControlHandle::new();
        let remote = control.clone();
        thread::spawn(move || remote.interrupt()).join().unwrap();
        assert!(control.is_interrupted());
    }
}
