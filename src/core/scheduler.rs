//! Periodic background refresh of the stored snapshot

use super::refresh::RefreshService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const EVENT_BUFFER: usize = 16;

/// Outcome of one scheduled refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    Updated {
        base_currency: String,
        currencies: usize,
    },
    Failed {
        reason: String,
    },
}

pub struct RefreshScheduler {
    service: Arc<RefreshService>,
    interval: Duration,
    initial_delay: Duration,
}

impl RefreshScheduler {
    pub fn new(service: Arc<RefreshService>, interval: Duration, initial_delay: Duration) -> Self {
        Self {
            service,
            interval,
            initial_delay,
        }
    }

    /// Starts the refresh loop on the current tokio runtime.
    pub fn spawn(self) -> SchedulerHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(self.run(cancel_rx, events_tx));

        SchedulerHandle {
            cancel: cancel_tx,
            events: events_rx,
            task,
        }
    }

    async fn run(self, mut cancel: watch::Receiver<bool>, events: mpsc::Sender<RefreshEvent>) {
        info!(
            interval = ?self.interval,
            initial_delay = ?self.initial_delay,
            "Refresh scheduler started"
        );

        if wait_or_cancel(&mut cancel, self.initial_delay).await {
            loop {
                // A tick always runs to completion; cancellation is only
                // observed between ticks.
                let event = self.tick().await;
                if let Err(e) = events.try_send(event) {
                    debug!("Dropping refresh event: {e}");
                }

                if !wait_or_cancel(&mut cancel, self.interval).await {
                    break;
                }
            }
        }

        info!("Refresh scheduler stopped");
    }

    async fn tick(&self) -> RefreshEvent {
        match self.service.refresh().await {
            Ok(snapshot) => RefreshEvent::Updated {
                base_currency: snapshot.base_currency().to_string(),
                currencies: snapshot.len(),
            },
            Err(e) => {
                error!(error = %e, "Scheduled refresh failed");
                RefreshEvent::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Waits for `period` unless cancelled first. Returns `true` if the loop
/// should keep going.
async fn wait_or_cancel(cancel: &mut watch::Receiver<bool>, period: Duration) -> bool {
    if *cancel.borrow() {
        return false;
    }
    if period.is_zero() {
        return true;
    }

    tokio::select! {
        _ = tokio::time::sleep(period) => {}
        // Also fires when the handle was dropped without a shutdown.
        _ = cancel.wait_for(|stop| *stop) => return false,
    }
    !*cancel.borrow()
}

/// Controls a running [`RefreshScheduler`].
pub struct SchedulerHandle {
    cancel: watch::Sender<bool>,
    events: mpsc::Receiver<RefreshEvent>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Waits for the next refresh outcome.
    pub async fn next_event(&mut self) -> Option<RefreshEvent> {
        self.events.recv().await
    }

    /// Returns an already-delivered refresh outcome without waiting.
    pub fn try_next_event(&mut self) -> Option<RefreshEvent> {
        self.events.try_recv().ok()
    }

    /// Signals the scheduler to stop and waits for an in-flight refresh to finish.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        if let Err(e) = self.task.await {
            warn!("Refresh scheduler task ended abnormally: {e}");
        }
    }
}
