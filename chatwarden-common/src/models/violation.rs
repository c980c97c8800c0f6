// File: chatwarden-common/src/models/violation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Categories of soft infractions counted per (user, chat, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    MlSpam,
    StopWords,
    TooManyEmojis,
    LookalikeChars,
    BoringGreeting,
}

impl ViolationKind {
    pub const ALL: [ViolationKind; 5] = [
        ViolationKind::MlSpam,
        ViolationKind::StopWords,
        ViolationKind::TooManyEmojis,
        ViolationKind::LookalikeChars,
        ViolationKind::BoringGreeting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MlSpam => "ml_spam",
            ViolationKind::StopWords => "stop_words",
            ViolationKind::TooManyEmojis => "too_many_emojis",
            ViolationKind::LookalikeChars => "lookalike_chars",
            ViolationKind::BoringGreeting => "boring_greeting",
        }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "ml_spam" => Ok(ViolationKind::MlSpam),
            "stop_words" => Ok(ViolationKind::StopWords),
            "too_many_emojis" => Ok(ViolationKind::TooManyEmojis),
            "lookalike_chars" => Ok(ViolationKind::LookalikeChars),
            "boring_greeting" => Ok(ViolationKind::BoringGreeting),
            other => Err(Error::Parse(format!("unknown violation kind '{}'", other))),
        }
    }
}

/// Running counter for one (user, chat, kind) triple. `expires_at` slides
/// forward on every increment; a counter past its expiry is treated as fresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolationRecord {
    pub user_id: i64,
    pub chat_id: i64,
    pub kind: ViolationKind,
    pub count: u32,
    pub expires_at: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
