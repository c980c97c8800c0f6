//! src/eventbus/audit_logger.rs
//!
//! Spawns a task that subscribes to the EventBus, buffers decision events,
//! and flushes them to the decision_log table. Drains the queue on
//! shutdown, then does a final flush.

use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{error, info};
use uuid::Uuid;

use chatwarden_common::models::audit::DecisionLogEntry;
use chatwarden_common::traits::DecisionLogRepository;

use crate::config::AuditConfig;
use crate::eventbus::{EventBus, GuardEvent};
use crate::Error;

/// Spawns the audit writer. Returns a `JoinHandle<()>` so callers can await
/// the final flush during shutdown.
pub async fn spawn_audit_logger_task<T>(
    event_bus: &EventBus,
    decision_repo: T,
    config: AuditConfig,
) -> JoinHandle<()>
where
    T: DecisionLogRepository + 'static,
{
    let mut rx = event_bus.subscribe(Some(config.batch_size * 4)).await;
    let mut shutdown_rx = event_bus.shutdown_rx.clone();

    tokio::spawn(async move {
        let batch_size = config.batch_size;
        let flush_interval = config.flush_interval;
        let mut buffer: Vec<DecisionLogEntry> = Vec::with_capacity(batch_size);
        let mut last_flush = Instant::now();

        info!(
            batch_size,
            flush_interval_ms = flush_interval.as_millis() as u64,
            "decision audit task started"
        );

        loop {
            tokio::select! {
                biased;
                maybe_event = rx.recv() => {
                    match maybe_event {
                        Some(event) => {
                            if let Some(entry) = convert_to_log_entry(&event) {
                                buffer.push(entry);
                            }
                            if buffer.len() >= batch_size {
                                if let Err(e) = flush(&decision_repo, &mut buffer).await {
                                    error!("error inserting decision batch: {:?}", e);
                                }
                                last_flush = Instant::now();
                            }
                        }
                        None => {
                            info!("audit channel closed, leaving loop");
                            break;
                        }
                    }
                },
                Ok(_) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("audit task shutting down, leaving loop");
                        break;
                    }
                },
                _ = sleep(flush_interval) => {
                    if !buffer.is_empty() && last_flush.elapsed() >= flush_interval {
                        if let Err(e) = flush(&decision_repo, &mut buffer).await {
                            error!("periodic audit flush error: {:?}", e);
                        }
                        last_flush = Instant::now();
                    }
                }
            }
        }

        // Drain whatever is still queued, then flush once more.
        while let Ok(event) = rx.try_recv() {
            if let Some(entry) = convert_to_log_entry(&event) {
                buffer.push(entry);
            }
        }

        if !buffer.is_empty() {
            info!(remaining = buffer.len(), "audit final flush");
            if let Err(e) = flush(&decision_repo, &mut buffer).await {
                error!("final audit flush error: {:?}", e);
            }
        }

        info!("decision audit task exited");
    })
}

fn convert_to_log_entry(event: &GuardEvent) -> Option<DecisionLogEntry> {
    if let GuardEvent::Decision {
        chat_id,
        user_id,
        message_id,
        decision,
        decided_at,
    } = event
    {
        Some(DecisionLogEntry {
            entry_id: Uuid::new_v4(),
            chat_id: *chat_id,
            user_id: *user_id,
            message_id: *message_id,
            action: decision.action.as_str().to_string(),
            reason: decision.reason.clone(),
            confidence: decision.confidence,
            decided_at: *decided_at,
        })
    } else {
        None
    }
}

async fn flush<T: DecisionLogRepository>(
    repo: &T,
    buffer: &mut Vec<DecisionLogEntry>,
) -> Result<(), Error> {
    if buffer.is_empty() {
        return Ok(());
    }
    repo.insert_batch(buffer).await?;
    buffer.clear();
    Ok(())
}
