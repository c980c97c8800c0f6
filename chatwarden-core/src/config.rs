// File: src/config.rs
//
// Explicit configuration value objects, one per component, aggregated in
// ModerationConfig. Components receive their slice at construction; nothing
// reads process-wide state. Defaults carry the tuned production values.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use chatwarden_common::models::message::MediaKind;
use chatwarden_common::models::violation::ViolationKind;

/// Whether approval is tracked once per user or separately per chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustScope {
    Global,
    PerChat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Case-insensitive substrings that trigger the stop-word rule.
    pub stop_words: Vec<String>,
    pub link_filter_enabled: bool,
    /// Emoji rule fires when count > emoji_limit AND text chars > emoji_min_text_len.
    pub emoji_limit: usize,
    pub emoji_min_text_len: usize,
    /// Lookalike rule fires when distinct mixed-script words > this.
    pub lookalike_word_limit: usize,
    /// Ban instead of delete on a lookalike hit.
    pub lookalike_action_ban: bool,
    /// Chats exempt from the emoji rule.
    pub announcement_chats: Vec<i64>,
    /// Media kinds an unapproved sender may not post.
    pub restricted_media: Vec<MediaKind>,
    pub classify_timeout: Duration,
    pub ai_probe_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stop_words: [
                "заработок",
                "зарабат",
                "крипт",
                "инвестиц",
                "казино",
                "ставки на спорт",
                "пассивный доход",
                "удалённая работа",
                "удаленная работа",
                "пиши в лс",
                "пишите в личку",
                "в личные сообщения",
                "схема дохода",
                "без вложений",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            link_filter_enabled: true,
            emoji_limit: 10,
            emoji_min_text_len: 20,
            lookalike_word_limit: 2,
            lookalike_action_ban: false,
            announcement_chats: Vec::new(),
            restricted_media: vec![
                MediaKind::Video,
                MediaKind::VideoNote,
                MediaKind::Sticker,
                MediaKind::Animation,
            ],
            classify_timeout: Duration::from_secs(15),
            ai_probe_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub retrain_interval: Duration,
    /// How long `predict` may wait for the first trained model.
    pub ready_wait: Duration,
    pub spam_threshold: f32,
    /// Scores in [review_threshold, spam_threshold) are flagged for review.
    pub review_threshold: f32,
    pub min_samples: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub l2_penalty: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            retrain_interval: Duration::from_secs(5 * 60),
            ready_wait: Duration::from_secs(1),
            spam_threshold: 0.5,
            review_threshold: 0.35,
            min_samples: 10,
            epochs: 25,
            learning_rate: 0.1,
            l2_penalty: 1e-3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MimicryConfig {
    /// Probation users scoring at or above this become suspicious.
    pub suspicious_threshold: f32,
}

impl Default for MimicryConfig {
    fn default() -> Self {
        Self {
            suspicious_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViolationConfig {
    pub ttl: Duration,
    /// Per-kind ban thresholds. Missing or zero disables banning for the
    /// kind; the counter still accumulates.
    pub thresholds: HashMap<ViolationKind, u32>,
    /// How often the maintenance task sweeps expired counters.
    pub prune_interval: Duration,
}

impl Default for ViolationConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            prune_interval: Duration::from_secs(60 * 60),
            thresholds: HashMap::from([
                (ViolationKind::MlSpam, 3),
                (ViolationKind::StopWords, 3),
                (ViolationKind::TooManyEmojis, 3),
                (ViolationKind::LookalikeChars, 2),
                (ViolationKind::BoringGreeting, 3),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Time a user has to answer before the challenge expires.
    pub expiry: Duration,
    /// Sweep window, slightly larger than `expiry` so the reconciliation
    /// sweep never races a live timer.
    pub sweep_grace: Duration,
    pub sweep_interval: Duration,
    pub temp_ban: Duration,
    pub options_per_challenge: usize,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            expiry: Duration::from_secs(72),
            sweep_grace: Duration::from_secs(78),
            sweep_interval: Duration::from_secs(30),
            temp_ban: Duration::from_secs(20 * 60),
            options_per_challenge: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    pub scope: TrustScope,
    /// Clean messages required to leave probation.
    pub probation_message_count: u32,
    /// Clean messages required for Suspicious -> Approved.
    pub suspicious_clear_threshold: u32,
    /// Run the AI probe for users entering the suspicious state.
    pub ai_detect_enabled: bool,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            scope: TrustScope::PerChat,
            probation_message_count: 3,
            suspicious_clear_threshold: 5,
            ai_detect_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Feed returning the full banned-id list as a JSON array. None
    /// disables refreshing; manual ids still apply.
    pub feed_url: Option<String>,
    pub refresh_interval: Duration,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    /// Always banned, regardless of what the feed returns.
    pub manual_banned_ids: Vec<i64>,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            refresh_interval: Duration::from_secs(10 * 60),
            retry_delay: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            manual_banned_ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            flush_interval: Duration::from_secs(5),
        }
    }
}

/// Everything the engine needs, in one place, cloneable per component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub pipeline: PipelineConfig,
    pub classifier: ClassifierConfig,
    pub mimicry: MimicryConfig,
    pub violation: ViolationConfig,
    pub captcha: CaptchaConfig,
    pub trust: TrustConfig,
    pub reputation: ReputationConfig,
    pub audit: AuditConfig,
}
