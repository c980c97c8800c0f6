// File: chatwarden-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::audit::DecisionLogEntry;
use crate::models::captcha::CaptchaChallenge;
use crate::models::classifier::LabeledSample;
use crate::models::trust::{StoredTrustRow, TrustRecord};
use crate::models::violation::ViolationRecord;

/// Persistence for per-(user, chat) trust states. Rows are loaded once at
/// startup into the in-memory mirror; afterwards every state change is
/// written through here before it is acted on.
#[async_trait]
pub trait TrustStateRepository: Send + Sync {
    async fn upsert(&self, record: &TrustRecord) -> Result<(), Error>;
    async fn delete(&self, user_id: i64, chat_id: i64) -> Result<(), Error>;
    /// Raw rows, unparsed. The caller runs schema migration on each.
    async fn load_all_rows(&self) -> Result<Vec<StoredTrustRow>, Error>;
}

#[async_trait]
pub trait ViolationRepository: Send + Sync {
    async fn upsert(&self, record: &ViolationRecord) -> Result<(), Error>;
    async fn delete_all(&self, user_id: i64, chat_id: i64) -> Result<(), Error>;
    /// Removes rows whose sliding window ended before `cutoff`.
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
    async fn load_all(&self) -> Result<Vec<ViolationRecord>, Error>;
}

#[async_trait]
pub trait CaptchaRepository: Send + Sync {
    async fn upsert(&self, challenge: &CaptchaChallenge) -> Result<(), Error>;
    async fn remove(&self, user_id: i64, chat_id: i64) -> Result<(), Error>;
    async fn load_all(&self) -> Result<Vec<CaptchaChallenge>, Error>;
}

#[async_trait]
pub trait SpamCorpusRepository: Send + Sync {
    async fn append(&self, sample: &LabeledSample) -> Result<(), Error>;
    async fn load_all(&self) -> Result<Vec<LabeledSample>, Error>;
}

/// Exact-match store of content hashes already confirmed as spam.
#[async_trait]
pub trait KnownSpamRepository: Send + Sync {
    async fn insert_hash(&self, content_hash: &str) -> Result<(), Error>;
    async fn load_all(&self) -> Result<Vec<String>, Error>;
}

#[async_trait]
pub trait DecisionLogRepository: Send + Sync {
    async fn insert_batch(&self, entries: &[DecisionLogEntry]) -> Result<(), Error>;
}
