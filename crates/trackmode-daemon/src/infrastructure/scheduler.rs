//! Tokio-backed implementation of the application's delay scheduler.
//!
//! Each scheduled timer is a spawned task that sleeps and then sends a
//! [`InterfaceEvent::TimerFired`] back into the interface event channel, so
//! expiries take the same serialized path into the controllers as every other
//! signal. Cancellation aborts the task; a task that already sent its event
//! is neutralised by the controller's token check instead.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::application::automouse::{AutomouseTimer, DelayScheduler, TimerHandle};
use crate::application::event_loop::InterfaceEvent;

/// Scheduler over `tokio::time` delivering expiries through the event channel.
pub struct TokioDelayScheduler {
    events: UnboundedSender<InterfaceEvent>,
    next_token: AtomicU64,
    tasks: Mutex<HashMap<u64, JoinHandle<()>>>,
}

impl TokioDelayScheduler {
    /// Creates a scheduler that delivers expiries into `events`.
    pub fn new(events: UnboundedSender<InterfaceEvent>) -> Self {
        Self {
            events,
            next_token: AtomicU64::new(0),
            tasks: Mutex::new(HashMap::new()),
        }
    }
}

impl DelayScheduler for TokioDelayScheduler {
    fn schedule(&self, delay: Duration, timer: AutomouseTimer) -> TimerHandle {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may already be gone during shutdown.
            let _ = events.send(InterfaceEvent::TimerFired { timer, token });
        });

        let mut tasks = self.tasks.lock().expect("lock poisoned");
        // Drop bookkeeping for timers that already fired; the map stays
        // bounded by the number of genuinely outstanding timers.
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(token, task);

        TimerHandle { timer, token }
    }

    fn cancel(&self, handle: &TimerHandle) {
        if let Some(task) = self.tasks.lock().expect("lock poisoned").remove(&handle.token) {
            task.abort();
        }
    }

    fn is_pending(&self, handle: &TimerHandle) -> bool {
        self.tasks
            .lock()
            .expect("lock poisoned")
            .get(&handle.token)
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
