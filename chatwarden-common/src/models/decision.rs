use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Allow,
    Delete,
    Ban,
    ReportForReview,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Allow => "allow",
            ModerationAction::Delete => "delete",
            ModerationAction::Ban => "ban",
            ModerationAction::ReportForReview => "report_for_review",
        }
    }
}

/// Outcome of one pipeline evaluation. Produced once per call; the engine
/// neither retries nor memoizes decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: ModerationAction,
    pub reason: String,
    pub confidence: f32,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            action: ModerationAction::Allow,
            reason: String::new(),
            confidence: 1.0,
        }
    }

    pub fn delete(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: ModerationAction::Delete,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn ban(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: ModerationAction::Ban,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn report(reason: impl Into<String>, confidence: f32) -> Self {
        Self {
            action: ModerationAction::ReportForReview,
            reason: reason.into(),
            confidence,
        }
    }

    pub fn is_allow(&self) -> bool {
        self.action == ModerationAction::Allow
    }
}
