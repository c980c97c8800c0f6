// File: chatwarden-common/src/traits/mod.rs

pub mod probe_traits;
pub mod repository_traits;

pub use probe_traits::AiSpamProbe;
pub use repository_traits::{
    CaptchaRepository, DecisionLogRepository, KnownSpamRepository, SpamCorpusRepository,
    TrustStateRepository, ViolationRepository,
};
