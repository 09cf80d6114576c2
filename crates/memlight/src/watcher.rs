//! Background polling watcher.
//!
//! A single long-lived task that periodically runs change detection
//! and, when files changed, an incremental update. Cycle failures are
//! logged and the loop continues. Stopping cancels between cycles
//! only: an update already holding the write lock runs to completion,
//! and the stop call waits (bounded) for the task to exit.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::engine::Engine;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Owner slot for the single watcher task. Starting while a task is
/// already running is a warning-level no-op.
#[derive(Default)]
pub struct WatcherHandle {
    running: Option<Watcher>,
}

struct Watcher {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawn the polling task if none is running. The first change
    /// check runs immediately; subsequent checks follow the interval.
    pub fn start(&mut self, engine: Engine, interval: Duration) {
        if self.running.is_some() {
            warn!("watcher already running; start ignored");
            return;
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let task = tokio::spawn(async move {
            info!("watcher started (interval {}s)", interval.as_secs());
            // First cycle runs immediately; a change already present at
            // startup is not held for a full interval.
            loop {
                run_cycle(&engine).await;
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            info!("watcher stopped");
        });

        self.running = Some(Watcher { token, task });
    }

    /// Signal the task to stop and wait for it, bounded by a timeout.
    /// A no-op when no task is running.
    pub async fn stop(&mut self) {
        let Some(watcher) = self.running.take() else {
            return;
        };
        watcher.token.cancel();
        match tokio::time::timeout(STOP_TIMEOUT, watcher.task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("watcher task panicked: {e}"),
            Err(_) => warn!("watcher did not stop within {}s", STOP_TIMEOUT.as_secs()),
        }
    }
}

async fn run_cycle(engine: &Engine) {
    match engine.check_for_changes().await {
        Ok(true) => {
            info!("changes detected, running incremental update");
            if let Err(e) = engine.build(true).await {
                warn!("incremental update failed: {e:#}");
            }
        }
        Ok(false) => {}
        Err(e) => warn!("change detection failed: {e:#}"),
    }
}
