// File: chatwarden-common/src/models/captcha.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable portion of one outstanding challenge for a (chat, user) pair.
/// `options` are indices into the fixed challenge catalog; `correct_index`
/// is the catalog index of the right answer, always one of `options`.
/// Expiry is computed from `created_at`, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    pub chat_id: i64,
    pub user_id: i64,
    pub options: Vec<usize>,
    pub correct_index: usize,
    pub created_at: DateTime<Utc>,
    pub join_message_id: Option<i64>,
    pub challenge_message_id: Option<i64>,
}

impl CaptchaChallenge {
    pub fn key(&self) -> (i64, i64) {
        (self.chat_id, self.user_id)
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
