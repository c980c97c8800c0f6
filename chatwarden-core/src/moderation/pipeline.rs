// File: src/moderation/pipeline.rs
//
// The ordered rule pipeline. `evaluate` runs the checks top to bottom and
// the first matching rule decides; the order is part of the contract, not
// an implementation detail. `on_good_message` is the escalation half that
// walks users from New through Probation toward Approved.
//
// Dependency calls made here (classifier, AI probe) are bounded by their
// configured timeouts and degrade to the safest non-destructive outcome.
// Nothing in this module panics or propagates a dependency failure out of
// `evaluate`; only malformed input is a synchronous error.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};

use chatwarden_common::models::action::ActionRequest;
use chatwarden_common::models::classifier::SpamVerdict;
use chatwarden_common::models::decision::{Decision, ModerationAction};
use chatwarden_common::models::message::InboundMessage;
use chatwarden_common::models::trust::TrustState;
use chatwarden_common::models::violation::ViolationKind;
use chatwarden_common::traits::AiSpamProbe;

use crate::classifier::SpamClassifier;
use crate::config::{MimicryConfig, PipelineConfig};
use crate::eventbus::{EventBus, GuardEvent};
use crate::mimicry;
use crate::services::{KnownSpamService, TrustService, ViolationService};
use crate::text::{count_emojis, find_links, is_bare_greeting, lookalike_word_count, normalize};
use crate::Error;

pub struct ModerationPipeline {
    trust: Arc<TrustService>,
    violations: Arc<ViolationService>,
    known_spam: Arc<KnownSpamService>,
    classifier: Arc<SpamClassifier>,
    event_bus: EventBus,
    probe: Option<Arc<dyn AiSpamProbe>>,
    config: PipelineConfig,
    mimicry_config: MimicryConfig,
}

impl ModerationPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        trust: Arc<TrustService>,
        violations: Arc<ViolationService>,
        known_spam: Arc<KnownSpamService>,
        classifier: Arc<SpamClassifier>,
        event_bus: EventBus,
        probe: Option<Arc<dyn AiSpamProbe>>,
        config: PipelineConfig,
        mimicry_config: MimicryConfig,
    ) -> Self {
        // Stop words are matched against normalized (lowercased) text.
        let mut config = config;
        for word in &mut config.stop_words {
            *word = word.to_lowercase();
        }
        Self {
            trust,
            violations,
            known_spam,
            classifier,
            event_bus,
            probe,
            config,
            mimicry_config,
        }
    }

    /// Decide what to do with one inbound message. Publishes the decision
    /// (and any transport actions it implies) on the event bus; a `Ban`
    /// outcome also runs trust cleanup so the record is terminal locally.
    pub async fn evaluate(&self, message: &InboundMessage) -> Result<Decision, Error> {
        if message.user_id <= 0 {
            return Err(Error::InvalidInput("message has no sender".to_string()));
        }

        let decision = self.run_rules(message).await;
        info!(
            chat_id = message.chat_id,
            user_id = message.user_id,
            message_id = message.message_id,
            action = decision.action.as_str(),
            reason = %decision.reason,
            "message evaluated"
        );

        if decision.action == ModerationAction::Ban {
            if let Err(e) = self.trust.ban(message.user_id, message.chat_id).await {
                warn!(
                    user_id = message.user_id,
                    chat_id = message.chat_id,
                    "ban cleanup failed: {:?}",
                    e
                );
            }
        }
        self.publish(message, &decision).await;
        Ok(decision)
    }

    async fn run_rules(&self, message: &InboundMessage) -> Decision {
        let chat_id = message.chat_id;
        let user_id = message.user_id;
        let state = self.trust.state_of(user_id, chat_id);
        let text = message.text_or_empty();

        // 1. External blacklist or an existing terminal ban.
        if self.trust.is_banned(user_id, chat_id) {
            return Decision::ban("blacklisted", 1.0);
        }

        // 2. Inline keyboards never come from a legitimate member.
        if message.has_reply_markup {
            return Decision::ban("сообщение с кнопками", 1.0);
        }

        // 3. Story shares.
        if message.is_story_share {
            return Decision::delete("story share", 1.0);
        }

        // Rules 1-3 apply to everyone; approval covers the rest.
        if state.is_approved() {
            return Decision::allow();
        }

        // 4. Media gate for unapproved senders, then the empty-text check.
        if let Some(kind) = message.media {
            if self.config.restricted_media.contains(&kind) {
                return Decision::delete(format!("restricted media: {}", media_name(kind)), 1.0);
            }
        }
        if text.trim().is_empty() {
            return if message.media.is_none() {
                Decision::report("empty message without media", 0.5)
            } else {
                Decision::allow()
            };
        }

        // 5. Exact hash match against confirmed spam.
        if self.known_spam.contains_text(text) {
            return Decision::ban("known spam", 1.0);
        }

        // 6. Links, plain or hidden in entities.
        if self.config.link_filter_enabled && find_links(text, &message.entities) {
            return Decision::delete("link in message", 0.9);
        }

        // 7. Emoji flood, except in announcement chats.
        if !self.config.announcement_chats.contains(&chat_id)
            && text.chars().count() > self.config.emoji_min_text_len
            && count_emojis(text) > self.config.emoji_limit
        {
            let breached = self
                .register(user_id, chat_id, ViolationKind::TooManyEmojis)
                .await;
            return self.delete_or_ban(breached, false, "too many emojis", 0.9);
        }

        // 8. Latin/Cyrillic homoglyph words.
        if lookalike_word_count(text) > self.config.lookalike_word_limit {
            let breached = self
                .register(user_id, chat_id, ViolationKind::LookalikeChars)
                .await;
            return self.delete_or_ban(
                breached,
                self.config.lookalike_action_ban,
                "lookalike characters",
                0.9,
            );
        }

        // 9. Stop words, substring match on normalized text.
        let normalized = normalize(text);
        if let Some(word) = self
            .config
            .stop_words
            .iter()
            .find(|w| !w.is_empty() && normalized.contains(w.as_str()))
        {
            let breached = self
                .register(user_id, chat_id, ViolationKind::StopWords)
                .await;
            return self.delete_or_ban(breached, false, &format!("stop word \"{}\"", word), 0.95);
        }

        // Bare template greetings from users still earning trust.
        if matches!(state, TrustState::New | TrustState::Probation { .. })
            && is_bare_greeting(text)
        {
            let breached = self
                .register(user_id, chat_id, ViolationKind::BoringGreeting)
                .await;
            return self.delete_or_ban(breached, false, "boring greeting", 0.8);
        }

        // Second opinion for suspicious users before the classifier.
        if let TrustState::Suspicious {
            ref first_messages,
            ai_detect_enabled: true,
            ..
        } = state
        {
            if let Some(verdict) = self.probe_suspicious(text, first_messages).await {
                if verdict {
                    let breached = self.register(user_id, chat_id, ViolationKind::MlSpam).await;
                    return self.delete_or_ban(breached, false, "flagged by ai probe", 0.85);
                }
            }
        }

        // 10. Trained classifier, bounded by its timeout.
        let verdict = match timeout(self.config.classify_timeout, self.classifier.predict(text)).await
        {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(user_id, chat_id, "classification timed out, treating as clean");
                SpamVerdict::clean()
            }
        };
        if verdict.is_spam {
            let breached = self.register(user_id, chat_id, ViolationKind::MlSpam).await;
            return self.delete_or_ban(
                breached,
                false,
                &format!("classifier score {:.2}", verdict.score),
                verdict.score,
            );
        }
        if verdict.score >= self.classifier.config().review_threshold {
            return Decision::report(
                format!("uncertain classifier score {:.2}", verdict.score),
                verdict.score,
            );
        }

        // 11. Nothing matched.
        Decision::allow()
    }

    /// Trust escalation, called once per message that was allowed through.
    pub async fn on_good_message(
        &self,
        user_id: i64,
        chat_id: i64,
        text: &str,
    ) -> Result<(), Error> {
        if user_id <= 0 {
            return Err(Error::InvalidInput("good message has no sender".to_string()));
        }

        match self.trust.state_of(user_id, chat_id) {
            TrustState::New => {
                self.trust
                    .set_state(
                        user_id,
                        chat_id,
                        TrustState::Probation {
                            good_message_count: 1,
                            first_messages: vec![text.to_string()],
                        },
                    )
                    .await?;
            }
            TrustState::Probation {
                good_message_count,
                mut first_messages,
            } => {
                if first_messages.len() < 3 {
                    first_messages.push(text.to_string());
                }
                let good_message_count = good_message_count + 1;
                if good_message_count >= self.trust.config().probation_message_count {
                    self.finish_probation(user_id, chat_id, first_messages).await?;
                } else {
                    self.trust
                        .set_state(
                            user_id,
                            chat_id,
                            TrustState::Probation {
                                good_message_count,
                                first_messages,
                            },
                        )
                        .await?;
                }
            }
            TrustState::Suspicious {
                marked_at,
                first_messages,
                mimicry_score,
                ai_detect_enabled,
                messages_since,
            } => {
                let messages_since = messages_since + 1;
                if messages_since >= self.trust.config().suspicious_clear_threshold {
                    self.trust.approve(user_id, chat_id).await?;
                    info!(user_id, chat_id, "suspicion cleared, user approved");
                } else {
                    self.trust
                        .set_state(
                            user_id,
                            chat_id,
                            TrustState::Suspicious {
                                marked_at,
                                first_messages,
                                mimicry_score,
                                ai_detect_enabled,
                                messages_since,
                            },
                        )
                        .await?;
                }
            }
            TrustState::Approved { .. } | TrustState::Banned => {}
        }
        Ok(())
    }

    /// End of the probation window: score the captured messages and either
    /// approve the user or mark them suspicious.
    async fn finish_probation(
        &self,
        user_id: i64,
        chat_id: i64,
        first_messages: Vec<String>,
    ) -> Result<(), Error> {
        let score = mimicry::score(&first_messages);
        if score >= self.mimicry_config.suspicious_threshold {
            self.trust
                .set_state(
                    user_id,
                    chat_id,
                    TrustState::Suspicious {
                        marked_at: Utc::now(),
                        first_messages: first_messages.clone(),
                        mimicry_score: score,
                        ai_detect_enabled: self.trust.config().ai_detect_enabled,
                        messages_since: 0,
                    },
                )
                .await?;
            self.event_bus
                .publish(GuardEvent::SuspiciousUser {
                    user_id,
                    chat_id,
                    mimicry_score: score,
                    first_messages,
                })
                .await;
            info!(user_id, chat_id, score, "probation user marked suspicious");
        } else {
            self.trust.approve(user_id, chat_id).await?;
            info!(user_id, chat_id, score, "probation passed, user approved");
        }
        Ok(())
    }

    /// Operator confirmed a message as spam: remember the exact content and
    /// feed the corpus.
    pub async fn record_confirmed_spam(&self, text: &str) -> Result<(), Error> {
        self.known_spam.remember(text).await?;
        self.classifier.add_labeled_example(text, true).await?;
        Ok(())
    }

    /// Operator confirmed a flagged message as legitimate.
    pub async fn record_confirmed_ham(&self, text: &str) -> Result<(), Error> {
        self.classifier.add_labeled_example(text, false).await
    }

    async fn probe_suspicious(&self, text: &str, first_messages: &[String]) -> Option<bool> {
        let probe = self.probe.as_ref()?;
        match timeout(self.config.ai_probe_timeout, probe.assess(text, first_messages)).await {
            Ok(Ok(is_spam)) => Some(is_spam),
            Ok(Err(e)) => {
                warn!("ai probe failed, falling through: {:?}", e);
                None
            }
            Err(_) => {
                warn!("ai probe timed out, falling through");
                None
            }
        }
    }

    /// A rule hit is a Delete until the violation counter (or configuration)
    /// escalates it to a Ban.
    fn delete_or_ban(
        &self,
        threshold_breached: bool,
        ban_configured: bool,
        reason: &str,
        confidence: f32,
    ) -> Decision {
        if threshold_breached {
            Decision::ban(format!("repeated violations: {}", reason), confidence)
        } else if ban_configured {
            Decision::ban(reason.to_string(), confidence)
        } else {
            Decision::delete(reason.to_string(), confidence)
        }
    }

    async fn register(&self, user_id: i64, chat_id: i64, kind: ViolationKind) -> bool {
        match self.violations.register_violation(user_id, chat_id, kind).await {
            Ok(breached) => breached,
            Err(e) => {
                warn!(
                    user_id,
                    chat_id,
                    kind = kind.as_str(),
                    "violation write failed: {:?}",
                    e
                );
                false
            }
        }
    }

    async fn publish(&self, message: &InboundMessage, decision: &Decision) {
        self.event_bus
            .publish_decision(
                message.chat_id,
                message.user_id,
                message.message_id,
                decision,
            )
            .await;

        match decision.action {
            ModerationAction::Delete => {
                self.event_bus
                    .publish(GuardEvent::Action(ActionRequest::DeleteMessage {
                        chat_id: message.chat_id,
                        message_id: message.message_id,
                    }))
                    .await;
            }
            ModerationAction::Ban => {
                self.event_bus
                    .publish(GuardEvent::Action(ActionRequest::DeleteMessage {
                        chat_id: message.chat_id,
                        message_id: message.message_id,
                    }))
                    .await;
                self.event_bus
                    .publish(GuardEvent::Action(ActionRequest::BanUser {
                        chat_id: message.chat_id,
                        user_id: message.user_id,
                        until: None,
                    }))
                    .await;
            }
            ModerationAction::Allow | ModerationAction::ReportForReview => {}
        }
    }
}

fn media_name(kind: chatwarden_common::models::message::MediaKind) -> &'static str {
    use chatwarden_common::models::message::MediaKind;
    match kind {
        MediaKind::Photo => "photo",
        MediaKind::Video => "video",
        MediaKind::Animation => "animation",
        MediaKind::Sticker => "sticker",
        MediaKind::Document => "document",
        MediaKind::Voice => "voice",
        MediaKind::VideoNote => "video note",
        MediaKind::Story => "story",
    }
}
