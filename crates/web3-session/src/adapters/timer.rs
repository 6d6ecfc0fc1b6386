//! Timer Adapter
//!
//! Implements the `TimerService` port with one tokio task per named timer.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use web3_telemetry::log_event;

use crate::ports::{OnTick, TimerService};

struct TimerEntry {
    id: u64,
    cancel: watch::Sender<bool>,
}

/// Named recurring/one-shot timers on the current tokio runtime.
///
/// Ticks of one timer run sequentially; a slow tick delays (and skips)
/// later ones instead of overlapping them.
#[derive(Default)]
pub struct TokioTimerService {
    timers: Arc<Mutex<HashMap<String, TimerEntry>>>,
    next_id: AtomicU64,
}

impl TokioTimerService {
    /// Create an empty timer service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the timers that can still tick.
    pub fn active_timers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.timers.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl TimerService for TokioTimerService {
    fn create_timer(&self, name: &str, interval: Duration, recurring: bool, on_tick: OnTick) {
        if interval.is_zero() {
            log_event!(warn, "timer", "Refusing zero-length interval", timer = %name);
            return;
        }

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let previous = self.timers.lock().insert(
            name.to_string(),
            TimerEntry {
                id,
                cancel: cancel_tx,
            },
        );
        if let Some(previous) = previous {
            let _ = previous.cancel.send(true);
            log_event!(debug, "timer", "Replaced running timer", timer = %name);
        }

        let timers = Arc::clone(&self.timers);
        let name = name.to_string();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    // Fires on cancel, and on sender drop (timer removed or service dropped)
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                on_tick().await;

                if !recurring {
                    break;
                }
            }

            let mut timers = timers.lock();
            if timers.get(&name).map(|entry| entry.id) == Some(id) {
                timers.remove(&name);
            }
            log_event!(debug, "timer", "Timer stopped", timer = %name);
        });
    }

    fn cancel(&self, name: &str) -> bool {
        match self.timers.lock().remove(name) {
            Some(entry) => {
                let _ = entry.cancel.send(true);
                log_event!(debug, "timer", "Cancelled timer", timer = %name);
                true
            }
            None => false,
        }
    }

    fn is_active(&self, name: &str) -> bool {
        self.timers.lock().contains_key(name)
    }
}
