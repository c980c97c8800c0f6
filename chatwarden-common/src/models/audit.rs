// File: chatwarden-common/src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Audit row describing one moderation decision, written asynchronously by
/// the decision logger task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub entry_id: Uuid,
    pub chat_id: i64,
    pub user_id: i64,
    pub message_id: i64,
    pub action: String,
    pub reason: String,
    pub confidence: f32,
    pub decided_at: DateTime<Utc>,
}
