// File: src/services/mod.rs

pub mod captcha_service;
pub mod known_spam;
pub mod reputation_service;
pub mod trust_service;
pub mod violation_service;

pub use captcha_service::CaptchaService;
pub use known_spam::KnownSpamService;
pub use reputation_service::ReputationService;
pub use trust_service::TrustService;
pub use violation_service::ViolationService;
