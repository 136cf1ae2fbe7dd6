// THEORY:
// The ticker is the one background task that drives a `FieldService`. It wakes
// on a fixed period and calls `tick`, and by default it never stops: it lives
// as long as the runtime does. A watch channel lets the owner pause, resume or
// stop it without changing what a tick does.

use crate::field_service::FieldService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerState {
    Running,
    Paused,
    Stopped,
}

/// Control surface for a spawned ticker. Dropping it leaves the ticker running.
pub struct TickerHandle {
    control_tx: watch::Sender<TickerState>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn pause(&self) {
        self.set(TickerState::Paused);
    }

    pub fn resume(&self) {
        self.set(TickerState::Running);
    }

    pub fn stop(&self) {
        self.set(TickerState::Stopped);
    }

    pub fn state(&self) -> TickerState {
        *self.control_tx.borrow()
    }

    /// Waits for the ticker task to finish. Only returns after `stop`.
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.task.await
    }

    fn set(&self, state: TickerState) {
        // The task never drops its receiver before exiting, and after exit the state is moot.
        let _ = self.control_tx.send(state);
    }
}

/// Spawns the periodic driver. The first tick fires one `period` after the call.
pub fn spawn_ticker(service: Arc<FieldService>, period: Duration) -> TickerHandle {
    let (control_tx, mut control_rx) = watch::channel(TickerState::Running);

    let task = tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut control_open = true;
        info!(period_ms = period.as_millis() as u64, "ticker started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let state = *control_rx.borrow();
                    match state {
                        TickerState::Running => {
                            if let Err(e) = service.tick().await {
                                error!(error = %e, "tick failed, field left unchanged");
                            }
                        }
                        TickerState::Paused => debug!("tick skipped while paused"),
                        TickerState::Stopped => break,
                    }
                }
                changed = control_rx.changed(), if control_open => {
                    if changed.is_err() {
                        // Handle dropped: keep ticking with the last state, forever.
                        control_open = false;
                    } else if *control_rx.borrow() == TickerState::Stopped {
                        break;
                    }
                }
            }
        }

        info!("ticker stopped");
    });

    TickerHandle { control_tx, task }
}
