// File: chatwarden-common/src/models/classifier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One labeled text in the training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub sample_id: Uuid,
    pub text: String,
    pub is_spam: bool,
    pub added_at: DateTime<Utc>,
}

impl LabeledSample {
    pub fn new(text: impl Into<String>, is_spam: bool) -> Self {
        Self {
            sample_id: Uuid::new_v4(),
            text: text.into(),
            is_spam,
            added_at: Utc::now(),
        }
    }
}

/// Classifier output: the binary call plus the raw probability behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpamVerdict {
    pub is_spam: bool,
    pub score: f32,
}

impl SpamVerdict {
    pub fn clean() -> Self {
        Self {
            is_spam: false,
            score: 0.0,
        }
    }
}
