//! Lock-guarded fault phase shared by faults with external side effects.
//!
//! The mutex covers only the check-and-transition steps. Callers perform the
//! external call between `begin_*` and the matching commit, with the lock
//! released.

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Phase<T> {
    Idle,
    Starting,
    Active(T),
    Stopping(T),
}

#[derive(Debug)]
pub(crate) struct StateCell<T> {
    phase: Mutex<Phase<T>>,
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Idle),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Phase<T>> {
        // Every phase value is valid.
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idle → Starting. Returns false if any other phase is current.
    pub fn begin_start(&self) -> bool {
        let mut phase = self.lock();
        if matches!(*phase, Phase::Idle) {
            *phase = Phase::Starting;
            true
        } else {
            false
        }
    }

    /// Commit a successful start.
    pub fn commit_start(&self, value: T) {
        *self.lock() = Phase::Active(value);
    }

    /// Roll back a failed start, unless a concurrent transition already
    /// replaced the `Starting` phase.
    pub fn abort_start(&self) {
        let mut phase = self.lock();
        if matches!(*phase, Phase::Starting) {
            *phase = Phase::Idle;
        }
    }

    /// Active → Stopping, handing back the active value.
    pub fn begin_stop(&self) -> Option<T> {
        let mut phase = self.lock();
        match &*phase {
            Phase::Active(value) => {
                let value = value.clone();
                *phase = Phase::Stopping(value.clone());
                Some(value)
            }
            _ => None,
        }
    }

    /// Commit a stop. Always lands in Idle.
    pub fn finish_stop(&self) {
        *self.lock() = Phase::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.lock(), Phase::Active(_))
    }

    /// Value recorded by the last committed start, while active.
    pub fn active_value(&self) -> Option<T> {
        match &*self.lock() {
            Phase::Active(value) => Some(value.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop_cycle() {
        let cell = StateCell::new();
        assert!(!cell.is_active());

        assert!(cell.begin_start());
        assert!(!cell.is_active());
        assert!(!cell.begin_start(), "second start must see Starting");

        cell.commit_start(200u64);
        assert!(cell.is_active());
        assert_eq!(cell.active_value(), Some(200));

        assert_eq!(cell.begin_stop(), Some(200));
        assert!(!cell.is_active());
        assert_eq!(cell.begin_stop(), None, "already stopping");

        cell.finish_stop();
        assert!(!cell.is_active());
        assert!(cell.begin_start());
    }

    #[test]
    fn test_abort_start_returns_to_idle() {
        let cell: StateCell<u64> = StateCell::new();
        assert!(cell.begin_start());
        cell.abort_start();
        assert!(!cell.is_active());
        assert!(cell.begin_start());
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let cell: StateCell<u64> = StateCell::new();
        assert_eq!(cell.begin_stop(), None);
    }

    #[test]
    fn test_abort_does_not_clobber_committed_state() {
        let cell = StateCell::new();
        assert!(cell.begin_start());
        cell.commit_start(5u64);
        cell.abort_start();
        assert!(cell.is_active());
    }
}
