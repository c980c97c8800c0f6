// File: chatwarden-common/src/models/mod.rs
pub mod action;
pub mod audit;
pub mod captcha;
pub mod classifier;
pub mod decision;
pub mod message;
pub mod trust;
pub mod violation;

pub use action::ActionRequest;
pub use audit::DecisionLogEntry;
pub use captcha::CaptchaChallenge;
pub use classifier::{LabeledSample, SpamVerdict};
pub use decision::{Decision, ModerationAction};
pub use message::{EntityKind, InboundMessage, MediaKind, MessageEntity};
pub use trust::{ApprovalScope, StoredTrustRow, TrustRecord, TrustState, TRUST_SCHEMA_VERSION};
pub use violation::{ViolationKind, ViolationRecord};
