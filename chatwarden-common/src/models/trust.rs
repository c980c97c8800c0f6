// File: chatwarden-common/src/models/trust.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Current on-disk schema version for serialized trust states.
pub const TRUST_SCHEMA_VERSION: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "chat_id", rename_all = "snake_case")]
pub enum ApprovalScope {
    Global,
    Chat(i64),
}

/// Trust tier of one user within one scope. Exactly one state exists per
/// (user, scope) at any time; `Banned` is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrustState {
    New,
    Probation {
        good_message_count: u32,
        /// First messages captured during probation, insertion order, at most 3.
        first_messages: Vec<String>,
    },
    Suspicious {
        marked_at: DateTime<Utc>,
        first_messages: Vec<String>,
        mimicry_score: f32,
        ai_detect_enabled: bool,
        messages_since: u32,
    },
    Approved {
        scope: ApprovalScope,
    },
    Banned,
}

impl TrustState {
    pub fn is_approved(&self) -> bool {
        matches!(self, TrustState::Approved { .. })
    }

    pub fn is_suspicious(&self) -> bool {
        matches!(self, TrustState::Suspicious { .. })
    }

    pub fn is_banned(&self) -> bool {
        matches!(self, TrustState::Banned)
    }
}

/// One trust record as the engine works with it. `chat_id` is 0 for rows
/// kept under global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustRecord {
    pub user_id: i64,
    pub chat_id: i64,
    pub state: TrustState,
    pub updated_at: DateTime<Utc>,
}

/// Raw persisted row before schema migration has been applied.
#[derive(Debug, Clone)]
pub struct StoredTrustRow {
    pub user_id: i64,
    pub chat_id: i64,
    pub schema_version: i32,
    pub state_json: String,
    pub updated_at: DateTime<Utc>,
}

/// Legacy (v1) payload: a flat, loosely-typed blob written by earlier
/// releases. Kept only so `migrate` can upgrade old databases in place.
#[derive(Debug, Deserialize)]
struct LegacyTrustBlob {
    #[serde(default)]
    approved: bool,
    #[serde(default)]
    banned: bool,
    #[serde(default)]
    messages: Vec<String>,
    #[serde(default)]
    message_count: u32,
}

impl StoredTrustRow {
    /// Parse the stored payload into a current-schema record. Returns the
    /// record plus whether a migration was applied (callers rewrite those
    /// rows once at load time).
    pub fn parse(&self) -> Result<(TrustRecord, bool), Error> {
        match self.schema_version {
            TRUST_SCHEMA_VERSION => {
                let state: TrustState = serde_json::from_str(&self.state_json)?;
                Ok((self.record_with(state), false))
            }
            1 => {
                let legacy: LegacyTrustBlob = serde_json::from_str(&self.state_json)?;
                Ok((self.record_with(migrate_legacy(legacy, self.chat_id)), true))
            }
            other => Err(Error::Parse(format!(
                "unsupported trust schema version {} for user {}",
                other, self.user_id
            ))),
        }
    }

    fn record_with(&self, state: TrustState) -> TrustRecord {
        TrustRecord {
            user_id: self.user_id,
            chat_id: self.chat_id,
            state,
            updated_at: self.updated_at,
        }
    }
}

fn migrate_legacy(blob: LegacyTrustBlob, chat_id: i64) -> TrustState {
    if blob.banned {
        return TrustState::Banned;
    }
    if blob.approved {
        let scope = if chat_id == 0 {
            ApprovalScope::Global
        } else {
            ApprovalScope::Chat(chat_id)
        };
        return TrustState::Approved { scope };
    }
    if blob.messages.is_empty() && blob.message_count == 0 {
        TrustState::New
    } else {
        let count = blob.message_count.max(blob.messages.len() as u32);
        TrustState::Probation {
            good_message_count: count,
            first_messages: blob.messages,
        }
    }
}
