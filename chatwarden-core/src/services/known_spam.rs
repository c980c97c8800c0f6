// File: src/services/known_spam.rs
//
// Exact-match catalog of confirmed spam. Content is normalized and hashed
// before it is stored or looked up, so trivial edits (case, invisible
// characters, whitespace runs) still hit the catalog.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use chatwarden_common::traits::KnownSpamRepository;

use crate::text::content_hash;
use crate::Error;

pub struct KnownSpamService {
    repo: Arc<dyn KnownSpamRepository>,
    hashes: DashMap<String, ()>,
}

impl KnownSpamService {
    pub fn new(repo: Arc<dyn KnownSpamRepository>) -> Self {
        Self {
            repo,
            hashes: DashMap::new(),
        }
    }

    pub async fn load(&self) -> Result<usize, Error> {
        let stored = self.repo.load_all().await?;
        for hash in &stored {
            self.hashes.insert(hash.clone(), ());
        }
        info!(count = stored.len(), "known spam hashes loaded");
        Ok(stored.len())
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.hashes.contains_key(&content_hash(text))
    }

    /// Record confirmed spam. Idempotent: re-remembering the same content
    /// is a no-op at both layers.
    pub async fn remember(&self, text: &str) -> Result<(), Error> {
        let hash = content_hash(text);
        self.repo.insert_hash(&hash).await?;
        debug!(%hash, "spam content remembered");
        self.hashes.insert(hash, ());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
