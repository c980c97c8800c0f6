// File: src/services/captcha_service.rs
//
// Join-gating challenge state machine. One live challenge per (chat, user);
// each carries its own cancellable expiry timer, and a reconciliation sweep
// with a slightly larger grace window catches challenges whose timer never
// fired. Expiry never depends on the timer alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::seq::index::sample;
use rand::Rng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use chatwarden_common::models::action::ActionRequest;
use chatwarden_common::models::captcha::CaptchaChallenge;
use chatwarden_common::traits::CaptchaRepository;

use crate::config::CaptchaConfig;
use crate::eventbus::{EventBus, GuardEvent};
use crate::Error;

/// Fixed question/answer catalog. A challenge stores catalog indices only;
/// the transport renders the correct entry's question as the prompt and
/// every picked entry's answer as a button.
pub const CATALOG: &[(&str, &str)] = &[
    ("Сколько будет два плюс два?", "четыре"),
    ("Какого цвета небо в ясный день?", "голубое"),
    ("Сколько дней в неделе?", "семь"),
    ("Что говорят при встрече?", "привет"),
    ("Сколько месяцев в году?", "двенадцать"),
    ("Какое животное говорит \"мяу\"?", "кошка"),
    ("Что пьют по утрам из кружки?", "кофе"),
    ("Сколько колёс у велосипеда?", "два"),
    ("Какое время года наступает после зимы?", "весна"),
    ("Что светит днём на небе?", "солнце"),
    ("Сколько пальцев на одной руке?", "пять"),
    ("Какого цвета трава летом?", "зелёная"),
    ("Что замерзает зимой на лужах?", "лёд"),
    ("Какое животное лает?", "собака"),
    ("Сколько будет десять минус один?", "девять"),
    ("Что капает из тучи во время дождя?", "вода"),
    ("Какой день недели идёт после пятницы?", "суббота"),
    ("Сколько букв в слове \"дом\"?", "три"),
];

struct LiveChallenge {
    challenge: CaptchaChallenge,
    timer: JoinHandle<()>,
}

pub struct CaptchaService {
    repo: Arc<dyn CaptchaRepository>,
    event_bus: EventBus,
    live: DashMap<(i64, i64), LiveChallenge>,
    config: CaptchaConfig,
}

impl CaptchaService {
    pub fn new(repo: Arc<dyn CaptchaRepository>, event_bus: EventBus, config: CaptchaConfig) -> Self {
        Self {
            repo,
            event_bus,
            live: DashMap::new(),
            config,
        }
    }

    /// Reload persisted challenges after a restart. Still-running ones get
    /// their timer re-armed with the remaining time; ones that ran out while
    /// the process was down are expired on the spot.
    pub async fn load(self: &Arc<Self>) -> Result<usize, Error> {
        let stored = self.repo.load_all().await?;
        let now = Utc::now();
        let expiry = chrono::Duration::from_std(self.config.expiry)
            .unwrap_or_else(|_| chrono::Duration::seconds(72));

        let mut rearmed = 0usize;
        let mut expired = 0usize;
        for challenge in stored {
            let age = challenge.age(now);
            if age >= expiry {
                self.finish_expiry(challenge).await;
                expired += 1;
                continue;
            }
            let remaining = (expiry - age).to_std().unwrap_or_default();
            let key = challenge.key();
            let timer =
                self.arm_timer(challenge.chat_id, challenge.user_id, challenge.created_at, remaining);
            self.live.insert(key, LiveChallenge { challenge, timer });
            rearmed += 1;
        }

        info!(rearmed, expired, "captcha challenges reloaded");
        Ok(rearmed)
    }

    /// Issue a challenge for a freshly joined user. Replaces any previous
    /// live challenge for the key; the old timer is cancelled, never queued.
    pub async fn create_challenge(
        self: &Arc<Self>,
        chat_id: i64,
        user_id: i64,
        join_message_id: Option<i64>,
    ) -> Result<CaptchaChallenge, Error> {
        let (options, correct_index) = {
            let mut rng = rand::rng();
            let count = self.config.options_per_challenge.clamp(1, CATALOG.len());
            let options = sample(&mut rng, CATALOG.len(), count).into_vec();
            let correct = options[rng.random_range(0..options.len())];
            (options, correct)
        };

        let challenge = CaptchaChallenge {
            chat_id,
            user_id,
            options,
            correct_index,
            created_at: Utc::now(),
            join_message_id,
            challenge_message_id: None,
        };
        self.repo.upsert(&challenge).await?;

        let timer = self.arm_timer(chat_id, user_id, challenge.created_at, self.config.expiry);
        let replaced = self.live.insert(
            (chat_id, user_id),
            LiveChallenge {
                challenge: challenge.clone(),
                timer,
            },
        );
        if let Some(previous) = replaced {
            previous.timer.abort();
            debug!(user_id, chat_id, "previous challenge replaced");
        }

        Ok(challenge)
    }

    /// Attach the id of the bot's challenge message so expiry can delete it.
    pub async fn set_challenge_message(
        &self,
        chat_id: i64,
        user_id: i64,
        message_id: i64,
    ) -> Result<(), Error> {
        let updated = {
            let mut entry = match self.live.get_mut(&(chat_id, user_id)) {
                Some(entry) => entry,
                None => return Ok(()),
            };
            entry.challenge.challenge_message_id = Some(message_id);
            entry.challenge.clone()
        };
        self.repo.upsert(&updated).await?;
        Ok(())
    }

    /// Single-use answer check. The challenge is consumed no matter what was
    /// submitted; a second call for the same key always reports no match,
    /// as does a key that never had a challenge.
    pub async fn validate(&self, chat_id: i64, user_id: i64, answer_index: usize) -> bool {
        let Some((_, live)) = self.live.remove(&(chat_id, user_id)) else {
            return false;
        };
        live.timer.abort();
        if let Err(e) = self.repo.remove(user_id, chat_id).await {
            warn!(user_id, chat_id, "failed to remove answered challenge: {:?}", e);
        }

        let matched = live.challenge.correct_index == answer_index;
        debug!(user_id, chat_id, matched, "captcha answered");
        matched
    }

    pub fn challenge_for(&self, chat_id: i64, user_id: i64) -> Option<CaptchaChallenge> {
        self.live
            .get(&(chat_id, user_id))
            .map(|entry| entry.challenge.clone())
    }

    pub fn config(&self) -> &CaptchaConfig {
        &self.config
    }

    /// Reconciliation sweep: expire challenges older than the grace window
    /// whose timer evidently never fired. Safe to run alongside live timers;
    /// the identity check means each challenge is expired at most once.
    pub async fn ban_expired_challenges(&self) -> usize {
        let now = Utc::now();
        let grace = chrono::Duration::from_std(self.config.sweep_grace)
            .unwrap_or_else(|_| chrono::Duration::seconds(78));

        let overdue: Vec<CaptchaChallenge> = self
            .live
            .iter()
            .filter(|entry| entry.value().challenge.age(now) >= grace)
            .map(|entry| entry.value().challenge.clone())
            .collect();

        let mut swept = 0usize;
        for challenge in overdue {
            let removed = self
                .live
                .remove_if(&challenge.key(), |_, live| {
                    live.challenge.created_at == challenge.created_at
                });
            if let Some((_, live)) = removed {
                live.timer.abort();
                self.finish_expiry(live.challenge).await;
                swept += 1;
            }
        }

        if swept > 0 {
            info!(swept, "sweep expired overdue challenges");
        }
        swept
    }

    fn arm_timer(
        self: &Arc<Self>,
        chat_id: i64,
        user_id: i64,
        created_at: DateTime<Utc>,
        delay: Duration,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            service.expire_if_current(chat_id, user_id, created_at).await;
        })
    }

    /// Timer body. The `created_at` identity check keeps a timer that lost a
    /// replace/validate race from acting on a newer challenge for its key.
    async fn expire_if_current(&self, chat_id: i64, user_id: i64, created_at: DateTime<Utc>) {
        let removed = self
            .live
            .remove_if(&(chat_id, user_id), |_, live| {
                live.challenge.created_at == created_at
            });
        if let Some((_, live)) = removed {
            self.finish_expiry(live.challenge).await;
        }
    }

    /// Side effects of an expired challenge: temp-ban the silent user, drop
    /// the challenge and join messages, schedule the unban.
    async fn finish_expiry(&self, challenge: CaptchaChallenge) {
        let (chat_id, user_id) = challenge.key();
        if let Err(e) = self.repo.remove(user_id, chat_id).await {
            warn!(user_id, chat_id, "failed to remove expired challenge: {:?}", e);
        }

        let ban_for = chrono::Duration::from_std(self.config.temp_ban)
            .unwrap_or_else(|_| chrono::Duration::minutes(20));
        self.event_bus
            .publish(GuardEvent::Action(ActionRequest::BanUser {
                chat_id,
                user_id,
                until: Some(Utc::now() + ban_for),
            }))
            .await;
        if let Some(message_id) = challenge.challenge_message_id {
            self.event_bus
                .publish(GuardEvent::Action(ActionRequest::DeleteMessage { chat_id, message_id }))
                .await;
        }
        if let Some(message_id) = challenge.join_message_id {
            self.event_bus
                .publish(GuardEvent::Action(ActionRequest::DeleteMessage { chat_id, message_id }))
                .await;
        }
        self.event_bus
            .publish(GuardEvent::CaptchaExpired { chat_id, user_id })
            .await;

        let bus = self.event_bus.clone();
        let mut shutdown_rx = bus.shutdown_rx.clone();
        let unban_after = self.config.temp_ban;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(unban_after) => {
                    bus.publish(GuardEvent::Action(ActionRequest::UnbanUser { chat_id, user_id }))
                        .await;
                }
                _ = shutdown_rx.changed() => {}
            }
        });

        info!(user_id, chat_id, "captcha expired, temporary ban requested");
    }
}
