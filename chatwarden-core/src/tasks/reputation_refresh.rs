// File: src/tasks/reputation_refresh.rs

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::services::ReputationService;

/// Spawns the feed refresh loop. Refreshes once immediately, then on the
/// configured interval; a failed pull keeps the previous list and retries
/// after the shorter retry delay.
pub fn spawn_reputation_refresh_task(
    reputation: Arc<ReputationService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let refresh_interval = reputation.config().refresh_interval;
        let retry_delay = reputation.config().retry_delay;
        info!(?refresh_interval, "reputation refresh task started");
        loop {
            let delay = match reputation.refresh().await {
                Ok(_) => refresh_interval,
                Err(e) => {
                    warn!("reputation refresh failed, keeping previous list: {:?}", e);
                    retry_delay
                }
            };
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("reputation refresh task shutting down");
                    break;
                }
            }
        }
    })
}
