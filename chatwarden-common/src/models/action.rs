// File: chatwarden-common/src/models/action.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side effects the engine asks its host to perform. The engine never talks
/// to the chat platform itself; it publishes these and moves on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    BanUser {
        chat_id: i64,
        user_id: i64,
        /// None bans permanently; Some bans until the given instant.
        until: Option<DateTime<Utc>>,
    },
    UnbanUser {
        chat_id: i64,
        user_id: i64,
    },
    DeleteMessage {
        chat_id: i64,
        message_id: i64,
    },
}
