// File: src/tasks/captcha_sweep.rs

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::info;

use crate::services::CaptchaService;

/// Spawns the reconciliation sweep that expires challenges whose per-entry
/// timer never fired. The sweep is idempotent, so overlapping with live
/// timers is harmless.
pub fn spawn_captcha_sweep_task(
    captcha: Arc<CaptchaService>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = captcha.config().sweep_interval;
        info!(?interval, "captcha sweep task started");
        loop {
            tokio::select! {
                _ = sleep(interval) => {
                    captcha.ban_expired_challenges().await;
                }
                _ = shutdown.changed() => {
                    info!("captcha sweep task shutting down");
                    break;
                }
            }
        }
    })
}
