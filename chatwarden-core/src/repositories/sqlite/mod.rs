// src/repositories/sqlite/mod.rs

pub mod captcha;
pub mod decision_log;
pub mod known_spam;
pub mod spam_corpus;
pub mod trust_state;
pub mod violations;

pub use captcha::SqliteCaptchaRepository;
pub use decision_log::SqliteDecisionLogRepository;
pub use known_spam::SqliteKnownSpamRepository;
pub use spam_corpus::SqliteSpamCorpusRepository;
pub use trust_state::SqliteTrustStateRepository;
pub use violations::SqliteViolationRepository;
