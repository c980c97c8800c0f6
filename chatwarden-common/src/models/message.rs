use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Media attached to an inbound message, as reported by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
    Sticker,
    Document,
    Voice,
    VideoNote,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Url,
    TextLink,
    Mention,
    Other,
}

/// A rich-text entity inside the message text (offsets are in characters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntity {
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    pub url: Option<String>,
}

/// Immutable snapshot of one inbound chat message. The engine never mutates
/// it and keeps no reference beyond the evaluation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub text: Option<String>,
    pub entities: Vec<MessageEntity>,
    pub media: Option<MediaKind>,
    pub has_reply_markup: bool,
    pub is_story_share: bool,
    pub timestamp: DateTime<Utc>,
}

impl InboundMessage {
    /// Plain text message with no media or markup.
    pub fn text_message(chat_id: i64, user_id: i64, message_id: i64, text: &str) -> Self {
        Self {
            message_id,
            chat_id,
            user_id,
            text: Some(text.to_string()),
            entities: Vec::new(),
            media: None,
            has_reply_markup: false,
            is_story_share: false,
            timestamp: Utc::now(),
        }
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}
