//! Report lifecycle and moderator actions.
//!
//! ```text
//! pending -> under_review -> { retained, removed, dismissed }
//! any status -> pending   (restore)
//! ```

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Retained,
    Removed,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Retained => "retained",
            Self::Removed => "removed",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "under_review" => Some(Self::UnderReview),
            "retained" => Some(Self::Retained),
            "removed" => Some(Self::Removed),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::UnderReview)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

/// Action a moderator applies to a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolveAction {
    Review,
    Hide,
    Restore,
    Retain,
    Dismiss,
    Remove,
}

impl ResolveAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "review" => Some(Self::Review),
            "hide" => Some(Self::Hide),
            "restore" => Some(Self::Restore),
            "retain" => Some(Self::Retain),
            "dismiss" => Some(Self::Dismiss),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::Hide => "hide",
            Self::Restore => "restore",
            Self::Retain => "retain",
            Self::Dismiss => "dismiss",
            Self::Remove => "remove",
        }
    }

    /// Status the report ends up in after this action.
    pub fn target_status(&self) -> ReportStatus {
        match self {
            Self::Review | Self::Hide => ReportStatus::UnderReview,
            Self::Restore => ReportStatus::Pending,
            Self::Retain => ReportStatus::Retained,
            Self::Remove => ReportStatus::Removed,
            Self::Dismiss => ReportStatus::Dismissed,
        }
    }
}

/// Outcome of checking an action against the current status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Apply the action and its side effects.
    Apply,
    /// The report is already in the terminal state this action produces;
    /// only the notes change.
    Repeat,
    /// The action is not allowed from the current status.
    Invalid,
}

pub fn check_transition(current: ReportStatus, action: ResolveAction) -> Transition {
    let target = action.target_status();

    if action == ResolveAction::Restore {
        return Transition::Apply;
    }

    if current.is_open() {
        return Transition::Apply;
    }

    if target == current {
        Transition::Repeat
    } else {
        Transition::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reports_accept_every_action() {
        for current in [ReportStatus::Pending, ReportStatus::UnderReview] {
            for action in [
                ResolveAction::Review,
                ResolveAction::Hide,
                ResolveAction::Restore,
                ResolveAction::Retain,
                ResolveAction::Dismiss,
                ResolveAction::Remove,
            ] {
                assert_eq!(check_transition(current, action), Transition::Apply);
            }
        }
    }

    #[test]
    fn test_terminal_reports_only_restore_or_repeat() {
        assert_eq!(
            check_transition(ReportStatus::Dismissed, ResolveAction::Dismiss),
            Transition::Repeat
        );
        assert_eq!(
            check_transition(ReportStatus::Removed, ResolveAction::Remove),
            Transition::Repeat
        );
        assert_eq!(
            check_transition(ReportStatus::Retained, ResolveAction::Restore),
            Transition::Apply
        );
        assert_eq!(
            check_transition(ReportStatus::Dismissed, ResolveAction::Retain),
            Transition::Invalid
        );
        assert_eq!(
            check_transition(ReportStatus::Removed, ResolveAction::Hide),
            Transition::Invalid
        );
        assert_eq!(
            check_transition(ReportStatus::Retained, ResolveAction::Review),
            Transition::Invalid
        );
    }

    #[test]
    fn test_action_strings() {
        assert_eq!(ResolveAction::parse("remove"), Some(ResolveAction::Remove));
        assert_eq!(ResolveAction::parse("delete"), None);
        assert_eq!(ResolveAction::Hide.target_status(), ReportStatus::UnderReview);
        assert_eq!(ResolveAction::Restore.target_status(), ReportStatus::Pending);
    }
}
