// File: src/tasks/classifier_training.rs

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::classifier::SpamClassifier;

/// Spawns the retraining loop: every `retrain_interval` the classifier is
/// rebuilt from the corpus, but only if new samples arrived since the last
/// run. The swap is atomic; in-flight predictions keep the old snapshot.
pub fn spawn_classifier_training_task(
    classifier: Arc<SpamClassifier>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let interval = classifier.config().retrain_interval;
        info!(?interval, "classifier training task started");
        loop {
            tokio::select! {
                _ = sleep(interval) => {
                    match classifier.train().await {
                        Ok(true) => {}
                        Ok(false) => debug!("no new samples, training skipped"),
                        Err(e) => error!("classifier training failed: {:?}", e),
                    }
                }
                _ = shutdown.changed() => {
                    info!("classifier training task shutting down");
                    break;
                }
            }
        }
    })
}
