//! src/eventbus/mod.rs
//!
//! In-process event bus with guaranteed delivery to multiple subscribers
//! via bounded MPSC queues. Decisions, action requests and state-change
//! notifications for the external executor all flow through here.

pub mod audit_logger;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch, Mutex};

use chatwarden_common::models::action::ActionRequest;
use chatwarden_common::models::decision::Decision;

/// Everything the engine announces to the outside world.
#[derive(Debug, Clone)]
pub enum GuardEvent {
    /// Outcome of one `evaluate` call.
    Decision {
        chat_id: i64,
        user_id: i64,
        message_id: i64,
        decision: Decision,
        decided_at: DateTime<Utc>,
    },

    /// A transport action the external gateway must perform.
    Action(ActionRequest),

    /// A probation user crossed the mimicry threshold; operators may want
    /// to look at the captured messages.
    SuspiciousUser {
        user_id: i64,
        chat_id: i64,
        mimicry_score: f32,
        first_messages: Vec<String>,
    },

    /// A join challenge ran out of time.
    CaptchaExpired { chat_id: i64, user_id: i64 },

    /// System-wide event for debugging or administration.
    SystemMessage(String),

    /// Periodic heartbeat.
    Tick,
}

impl GuardEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GuardEvent::Decision { .. } => "decision",
            GuardEvent::Action(_) => "action",
            GuardEvent::SuspiciousUser { .. } => "suspicious_user",
            GuardEvent::CaptchaExpired { .. } => "captcha_expired",
            GuardEvent::SystemMessage(_) => "system_message",
            GuardEvent::Tick => "tick",
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<GuardEvent>`.
///
/// - If a subscriber's buffer fills, `publish` awaits until there is space
///   (backpressure).
/// - If a subscriber dropped its `Receiver`, sending to it fails and the
///   event is simply not delivered there.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<GuardEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

const DEFAULT_BUFFER_SIZE: usize = 10000;

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<GuardEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: GuardEvent) {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }

    /// Convenience method: publish the outcome of one evaluation.
    pub async fn publish_decision(
        &self,
        chat_id: i64,
        user_id: i64,
        message_id: i64,
        decision: &Decision,
    ) {
        self.publish(GuardEvent::Decision {
            chat_id,
            user_id,
            message_id,
            decision: decision.clone(),
            decided_at: Utc::now(),
        })
        .await;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
