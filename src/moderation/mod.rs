//! Report intake, triage and resolution.

pub mod cascade;
pub mod intake;
pub mod item;
pub mod resolution;
pub mod severity;
pub mod status;

pub use intake::{get_report, list_reports, submit_report, SubmitReport, SubmittedReport};
pub use item::{ItemContext, ItemType};
pub use resolution::{resolve_report, ResolveReport, ResolvedReport};
pub use severity::Severity;
pub use status::{ReportStatus, ResolveAction};

use crate::orm::reports;
use serde::Serialize;

/// Report as exposed over the API.
#[derive(Clone, Debug, Serialize)]
pub struct ReportView {
    pub id: i32,
    pub item_type: String,
    pub item_id: i32,
    pub forum_id: Option<i32>,
    pub thread_id: Option<i32>,
    pub community_id: Option<i32>,
    pub reported_user_id: Option<i32>,
    pub reporter_id: i32,
    pub reason_code: String,
    pub reason_text: Option<String>,
    pub severity: String,
    pub details: Option<String>,
    pub status: String,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<chrono::NaiveDateTime>,
    pub resolution_notes: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<reports::Model> for ReportView {
    fn from(r: reports::Model) -> Self {
        Self {
            id: r.id,
            item_type: r.item_type,
            item_id: r.item_id,
            forum_id: r.forum_id,
            thread_id: r.thread_id,
            community_id: r.community_id,
            reported_user_id: r.reported_user_id,
            reporter_id: r.reporter_id,
            reason_code: r.reason_code,
            reason_text: r.reason_text,
            severity: r.severity,
            details: r.details,
            status: r.status,
            resolved_by: r.resolved_by,
            resolved_at: r.resolved_at,
            resolution_notes: r.resolution_notes,
            created_at: r.created_at,
        }
    }
}

/// Community ambassadors first, then super-admins, without duplicates and
/// never the reporter.
pub fn select_recipients(ambassadors: &[i32], super_admins: &[i32], reporter_id: i32) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::with_capacity(ambassadors.len() + super_admins.len());
    for &id in ambassadors.iter().chain(super_admins) {
        if id != reporter_id && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::select_recipients;

    #[test]
    fn test_reporter_is_excluded() {
        assert_eq!(select_recipients(&[1, 2, 3], &[], 2), vec![1, 3]);
        assert_eq!(select_recipients(&[], &[5], 5), Vec::<i32>::new());
    }

    #[test]
    fn test_super_admin_who_is_also_ambassador_is_notified_once() {
        assert_eq!(select_recipients(&[4, 9], &[9, 1], 7), vec![4, 9, 1]);
    }
}
