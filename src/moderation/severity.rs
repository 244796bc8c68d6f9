//! Report triage tiers.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Static reason code table. Unmapped codes are low.
    pub fn from_reason_code(code: &str) -> Self {
        match code {
            "harassment" | "hate_speech" | "threats" | "violence" | "self_harm"
            | "sexual_content" | "illegal_activity" => Self::High,
            "bullying" | "misinformation" | "impersonation" | "inappropriate"
            | "privacy_violation" => Self::Medium,
            _ => Self::Low,
        }
    }

    /// High and critical reports hide the item and page super-admins.
    pub fn escalates(&self) -> bool {
        *self >= Self::High
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}
