// src/repositories/mod.rs

pub mod sqlite;

pub use sqlite::captcha::SqliteCaptchaRepository;
pub use sqlite::decision_log::SqliteDecisionLogRepository;
pub use sqlite::known_spam::SqliteKnownSpamRepository;
pub use sqlite::spam_corpus::SqliteSpamCorpusRepository;
pub use sqlite::trust_state::SqliteTrustStateRepository;
pub use sqlite::violations::SqliteViolationRepository;
