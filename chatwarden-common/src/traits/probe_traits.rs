// File: chatwarden-common/src/traits/probe_traits.rs

use async_trait::async_trait;

use crate::error::Error;

/// Secondary spam opinion for users already marked suspicious. Implementors
/// typically call out to an external model service; the engine bounds the
/// call with its own timeout and treats errors as "not spam".
#[async_trait]
pub trait AiSpamProbe: Send + Sync {
    async fn assess(&self, text: &str, first_messages: &[String]) -> Result<bool, Error>;
}
