//! Wall-clock deferred tasks for session teardown.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Deferred work run exactly once
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a wall-clock delay, without blocking the caller
pub trait TeardownTimer: Send + Sync {
    fn schedule(&self, delay: Duration, task: TimerTask);
}

/// Timer backed by one sleeping thread per task
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

impl TeardownTimer for ThreadTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let slot = Arc::new(Mutex::new(Some(task)));
        let worker_slot = Arc::clone(&slot);

        let spawned = thread::Builder::new()
            .name("session-teardown".into())
            .spawn(move || {
                thread::sleep(delay);
                if let Some(task) = take_task(&worker_slot) {
                    task();
                }
            });

        if let Err(e) = spawned {
            // No thread to defer on: release immediately instead of never
            tracing::debug!(error = %e, "teardown thread spawn failed");
            if let Some(task) = take_task(&slot) {
                task();
            }
        }
    }
}

fn take_task(slot: &Mutex<Option<TimerTask>>) -> Option<TimerTask> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

/// Virtual-clock timer advanced explicitly by the caller
///
/// Used for offline rendering, where "wall clock" is the number of frames
/// rendered so far, and for deterministic tests.
#[derive(Default)]
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    pending: Vec<(Duration, TimerTask)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation
    pub fn now(&self) -> Duration {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now
    }

    /// Deadlines of tasks not yet run, relative to creation
    pub fn pending_deadlines(&self) -> Vec<Duration> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.pending.iter().map(|(deadline, _)| *deadline).collect()
    }

    /// Move virtual time forward and run every task now due, earliest first
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let due = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.now += by;
            let now = state.now;
            let (mut due, rest): (Vec<_>, Vec<_>) = state
                .pending
                .drain(..)
                .partition(|(deadline, _)| *deadline <= now);
            state.pending = rest;
            due.sort_by_key(|(deadline, _)| *deadline);
            due
        };

        // Run outside the lock so tasks may schedule further work
        let count = due.len();
        for (_, task) in due {
            task();
        }
        count
    }
}

impl TeardownTimer for ManualTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = state.now + delay;
        state.pending.push((deadline, task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_manual_timer_fires_at_deadline() {
        let timer = ManualTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        timer.schedule(
            Duration::from_millis(2000),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(timer.pending_deadlines(), vec![Duration::from_millis(2000)]);
        assert_eq!(timer.advance(Duration::from_millis(1999)), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.pending_deadlines().is_empty());
    }

    #[test]
    fn test_thread_timer_runs_task() {
        let (tx, rx) = std::sync::mpsc::channel();
        ThreadTimer.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
