// File: src/services/violation_service.rs
//
// Per-(user, chat, kind) violation counters with a sliding 24h window.
// Counters live in a DashMap and are written through to the violations
// table on every change, so a restart resumes exactly where it stopped.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use chatwarden_common::models::violation::{ViolationKind, ViolationRecord};
use chatwarden_common::traits::ViolationRepository;

use crate::config::ViolationConfig;
use crate::Error;

pub struct ViolationService {
    repo: Arc<dyn ViolationRepository>,
    counters: DashMap<(i64, i64, ViolationKind), ViolationRecord>,
    config: ViolationConfig,
}

impl ViolationService {
    pub fn new(repo: Arc<dyn ViolationRepository>, config: ViolationConfig) -> Self {
        Self {
            repo,
            counters: DashMap::new(),
            config,
        }
    }

    /// Fill the in-memory counters from the table. Entries already past
    /// their window are dropped rather than loaded.
    pub async fn load(&self) -> Result<usize, Error> {
        let now = Utc::now();
        let records = self.repo.load_all().await?;
        let mut loaded = 0usize;
        for record in records {
            if record.is_expired(now) {
                continue;
            }
            self.counters
                .insert((record.user_id, record.chat_id, record.kind), record);
            loaded += 1;
        }
        info!(loaded, "violation counters loaded");
        Ok(loaded)
    }

    /// Count one violation. Returns true exactly when the post-increment
    /// count reaches the kind's configured threshold; a zero or missing
    /// threshold never signals, though counting continues.
    pub async fn register_violation(
        &self,
        user_id: i64,
        chat_id: i64,
        kind: ViolationKind,
    ) -> Result<bool, Error> {
        let now = Utc::now();
        let ttl = Duration::from_std(self.config.ttl).unwrap_or_else(|_| Duration::hours(24));

        let record = {
            let mut entry = self
                .counters
                .entry((user_id, chat_id, kind))
                .or_insert_with(|| ViolationRecord {
                    user_id,
                    chat_id,
                    kind,
                    count: 0,
                    expires_at: now + ttl,
                });
            // A counter past its window restarts from zero.
            if entry.is_expired(now) {
                entry.count = 0;
            }
            entry.count += 1;
            entry.expires_at = now + ttl;
            entry.clone()
        };

        self.repo.upsert(&record).await?;

        let threshold = self.config.thresholds.get(&kind).copied().unwrap_or(0);
        let breached = threshold > 0 && record.count == threshold;
        debug!(
            user_id,
            chat_id,
            kind = kind.as_str(),
            count = record.count,
            breached,
            "violation registered"
        );
        Ok(breached)
    }

    pub fn get_count(&self, user_id: i64, chat_id: i64, kind: ViolationKind) -> u32 {
        let now = Utc::now();
        match self.counters.get(&(user_id, chat_id, kind)) {
            Some(entry) if !entry.is_expired(now) => entry.count,
            _ => 0,
        }
    }

    /// Clear every counter for the pair. Part of ban cleanup.
    pub async fn reset_violations(&self, user_id: i64, chat_id: i64) -> Result<(), Error> {
        for kind in ViolationKind::ALL {
            self.counters.remove(&(user_id, chat_id, kind));
        }
        self.repo.delete_all(user_id, chat_id).await?;
        Ok(())
    }

    /// Drop expired counters from memory and the table.
    pub async fn prune_expired(&self) -> Result<u64, Error> {
        let now = Utc::now();
        self.counters.retain(|_, record| !record.is_expired(now));
        let removed = self.repo.delete_expired(now).await?;
        if removed > 0 {
            debug!(removed, "expired violation rows pruned");
        }
        Ok(removed)
    }

    pub fn config(&self) -> &ViolationConfig {
        &self.config
    }
}
