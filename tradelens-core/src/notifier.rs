//! Placeholder for a live-data feed.
//!
//! The background loop only logs on every tick. It exists so the run has a
//! start/stop lifecycle to hang a real feed on later, and it stops promptly
//! on request instead of waiting out the current interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("update notifier is already running")]
    AlreadyRunning,

    #[error("failed to spawn update thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct Running {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

pub struct UpdateNotifier {
    interval: Duration,
    ticks: Arc<AtomicU64>,
    running: Option<Running>,
}

impl UpdateNotifier {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticks: Arc::new(AtomicU64::new(0)),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Placeholder ticks elapsed since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Spawn the background loop.
    pub fn start(&mut self) -> Result<(), NotifierError> {
        if self.running.is_some() {
            return Err(NotifierError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let ticks = Arc::clone(&self.ticks);

        let handle = std::thread::Builder::new()
            .name("update-notifier".into())
            .spawn(move || {
                info!("Starting real-time updates (placeholder).");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            ticks.fetch_add(1, Ordering::Relaxed);
                            info!("Real-time update placeholder running...");
                        }
                        // Explicit stop, or the notifier was dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("Real-time updates stopped.");
            })?;

        self.running = Some(Running { stop_tx, handle });
        Ok(())
    }

    /// Signal the loop and wait for it to exit. No-op when not running.
    pub fn stop(&mut self) {
        if let Some(Running { stop_tx, handle }) = self.running.take() {
            // The receiver only disappears if the thread already exited
            let _ = stop_tx.send(());
            if handle.join().is_err() {
                warn!("update notifier thread panicked");
            }
        }
    }
}

impl Drop for UpdateNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}
