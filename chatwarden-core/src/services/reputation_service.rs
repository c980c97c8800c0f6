// File: src/services/reputation_service.rs
//
// Cached view of the external banned-id feed. Refreshes replace the whole
// snapshot; readers clone an Arc and never block a refresh. Manual override
// ids come from configuration and are consulted before the feed snapshot.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::ReputationConfig;
use crate::http::HttpClient;
use crate::Error;

/// One immutable view of the feed.
pub struct ReputationList {
    pub banned_ids: HashSet<i64>,
    pub refreshed_at: DateTime<Utc>,
}

pub struct ReputationService {
    http: Arc<dyn HttpClient<Error = Error>>,
    snapshot: RwLock<Arc<ReputationList>>,
    manual_banned: HashSet<i64>,
    config: ReputationConfig,
}

impl ReputationService {
    pub fn new(http: Arc<dyn HttpClient<Error = Error>>, config: ReputationConfig) -> Self {
        let manual_banned: HashSet<i64> = config.manual_banned_ids.iter().copied().collect();
        let empty = Arc::new(ReputationList {
            banned_ids: HashSet::new(),
            refreshed_at: Utc::now(),
        });
        Self {
            http,
            snapshot: RwLock::new(empty),
            manual_banned,
            config,
        }
    }

    /// Manual overrides first, then the cached feed snapshot.
    pub fn is_banned(&self, user_id: i64) -> bool {
        if self.manual_banned.contains(&user_id) {
            return true;
        }
        self.current().banned_ids.contains(&user_id)
    }

    pub fn current(&self) -> Arc<ReputationList> {
        self.snapshot.read().clone()
    }

    /// Pull the full feed and replace the snapshot. A failed fetch keeps the
    /// previous snapshot untouched; stale upstream entries disappear because
    /// the set is replaced, never merged.
    pub async fn refresh(&self) -> Result<usize, Error> {
        let url = match &self.config.feed_url {
            Some(url) => url.clone(),
            None => {
                debug!("no reputation feed configured, skipping refresh");
                return Ok(0);
            }
        };

        let body = self.http.get(url, HashMap::new()).await?;
        let ids: Vec<i64> = serde_json::from_str(&body)
            .map_err(|e| Error::Reputation(format!("malformed feed payload: {}", e)))?;

        let fresh = Arc::new(ReputationList {
            banned_ids: ids.into_iter().collect(),
            refreshed_at: Utc::now(),
        });
        let count = fresh.banned_ids.len();
        *self.snapshot.write() = fresh;

        info!(banned = count, "reputation list refreshed");
        Ok(count)
    }

    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }
}
