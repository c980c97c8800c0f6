// File: src/services/trust_service.rs
//
// Durable trust-state store with an in-memory mirror. States are loaded
// once at startup (running the schema migration where needed); afterwards
// every transition is written to the table before the mirror is updated, so
// the mirror never claims something the database does not know yet.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, warn};

use chatwarden_common::models::trust::{ApprovalScope, TrustRecord, TrustState};
use chatwarden_common::traits::TrustStateRepository;

use crate::config::{TrustConfig, TrustScope};
use crate::services::reputation_service::ReputationService;
use crate::services::violation_service::ViolationService;
use crate::Error;

pub struct TrustService {
    repo: Arc<dyn TrustStateRepository>,
    reputation: Arc<ReputationService>,
    violations: Arc<ViolationService>,
    states: DashMap<(i64, i64), TrustState>,
    config: TrustConfig,
}

impl TrustService {
    pub fn new(
        repo: Arc<dyn TrustStateRepository>,
        reputation: Arc<ReputationService>,
        violations: Arc<ViolationService>,
        config: TrustConfig,
    ) -> Self {
        Self {
            repo,
            reputation,
            violations,
            states: DashMap::new(),
            config,
        }
    }

    /// Chat component of the mirror key. Global scope folds every chat into
    /// one record per user.
    fn chat_key(&self, chat_id: i64) -> i64 {
        match self.config.scope {
            TrustScope::Global => 0,
            TrustScope::PerChat => chat_id,
        }
    }

    /// Load all rows, migrating old-schema payloads in place.
    pub async fn load(&self) -> Result<usize, Error> {
        let rows = self.repo.load_all_rows().await?;
        let mut loaded = 0usize;
        let mut migrated = 0usize;

        for row in rows {
            match row.parse() {
                Ok((record, was_migrated)) => {
                    if was_migrated {
                        self.repo.upsert(&record).await?;
                        migrated += 1;
                    }
                    self.states
                        .insert((record.user_id, record.chat_id), record.state);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(
                        user_id = row.user_id,
                        chat_id = row.chat_id,
                        "skipping unreadable trust row: {:?}",
                        e
                    );
                }
            }
        }

        info!(loaded, migrated, "trust states loaded");
        Ok(loaded)
    }

    pub fn state_of(&self, user_id: i64, chat_id: i64) -> TrustState {
        let key = (user_id, self.chat_key(chat_id));
        self.states
            .get(&key)
            .map(|entry| entry.value().clone())
            .unwrap_or(TrustState::New)
    }

    /// Durable write first, mirror second.
    pub async fn set_state(
        &self,
        user_id: i64,
        chat_id: i64,
        state: TrustState,
    ) -> Result<(), Error> {
        let chat_key = self.chat_key(chat_id);
        let record = TrustRecord {
            user_id,
            chat_id: chat_key,
            state: state.clone(),
            updated_at: Utc::now(),
        };
        self.repo.upsert(&record).await?;
        self.states.insert((user_id, chat_key), state);
        Ok(())
    }

    pub fn is_approved(&self, user_id: i64, chat_id: i64) -> bool {
        self.state_of(user_id, chat_id).is_approved()
    }

    pub fn is_suspicious(&self, user_id: i64, chat_id: i64) -> bool {
        self.state_of(user_id, chat_id).is_suspicious()
    }

    /// Local Banned record, the external feed, or a manual override.
    pub fn is_banned(&self, user_id: i64, chat_id: i64) -> bool {
        if self.reputation.is_banned(user_id) {
            return true;
        }
        self.state_of(user_id, chat_id).is_banned()
    }

    pub async fn approve(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        let scope = match self.config.scope {
            TrustScope::Global => ApprovalScope::Global,
            TrustScope::PerChat => ApprovalScope::Chat(chat_id),
        };
        self.set_state(user_id, chat_id, TrustState::Approved { scope })
            .await?;
        debug!(user_id, chat_id, "user approved");
        Ok(())
    }

    /// Drop approval (and any other trust record) so the user starts over
    /// as New. `all` clears the user across every chat.
    pub async fn remove_approval(
        &self,
        user_id: i64,
        chat_id: i64,
        all: bool,
    ) -> Result<(), Error> {
        if all {
            let keys: Vec<(i64, i64)> = self
                .states
                .iter()
                .filter(|entry| entry.key().0 == user_id)
                .map(|entry| *entry.key())
                .collect();
            for (uid, ck) in keys {
                self.repo.delete(uid, ck).await?;
                self.states.remove(&(uid, ck));
            }
        } else {
            let chat_key = self.chat_key(chat_id);
            self.repo.delete(user_id, chat_key).await?;
            self.states.remove(&(user_id, chat_key));
        }
        Ok(())
    }

    /// Terminal ban with full cleanup: the Banned record replaces whatever
    /// state existed (approval, suspicion, probation captures) and every
    /// violation counter for the pair is cleared.
    pub async fn ban(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        self.set_state(user_id, chat_id, TrustState::Banned).await?;
        self.violations.reset_violations(user_id, chat_id).await?;
        info!(user_id, chat_id, "user banned, trust cleanup done");
        Ok(())
    }

    pub fn config(&self) -> &TrustConfig {
        &self.config
    }
}
