// File: src/tasks/violation_prune.rs

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info};

use crate::services::ViolationService;

/// Spawns the sweep dropping violation counters whose sliding window ended.
/// Counters are also lazily reset on touch; this keeps the table and the
/// map from accumulating rows for users who never came back.
pub fn spawn_violation_prune_task(
    violations: Arc<ViolationService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = violations.config().prune_interval;
        info!(?interval, "violation prune task started");
        loop {
            tokio::select! {
                _ = sleep(interval) => {
                    if let Err(e) = violations.prune_expired().await {
                        error!("violation prune failed: {:?}", e);
                    }
                }
                _ = shutdown.changed() => {
                    info!("violation prune task shutting down");
                    break;
                }
            }
        }
    })
}
