//! Report resolution: permission gate, status transition, item mutation and
//! notifications, applied atomically.

use super::cascade;
use super::item::{self, ItemType};
use super::status::{check_transition, Transition};
use super::{ReportStatus, ReportView, ResolveAction};
use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::reports;
use chrono::Utc;
use sea_orm::{entity::*, ConnectionTrait, DatabaseConnection, DbErr, Set, TransactionTrait};
use serde::Serialize;

#[derive(Clone, Debug, Default)]
pub struct ResolveReport {
    pub action: String,
    pub notes: Option<String>,
}

/// What a `remove` did to the reported item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub forums: u64,
    pub threads: u64,
    pub posts: u64,
    /// Set when the item type is hidden instead of deleted.
    pub hidden: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedReport {
    pub report: ReportView,
    pub action: ResolveAction,
    /// False when the call repeated the action that produced the current
    /// status; only the notes were written.
    pub changed: bool,
    pub removed: Option<RemovalOutcome>,
}

async fn remove_item<C>(db: &C, item_type: ItemType, item_id: i32) -> Result<RemovalOutcome, DbErr>
where
    C: ConnectionTrait,
{
    let outcome = match item_type {
        ItemType::Post | ItemType::Comment => RemovalOutcome {
            posts: cascade::delete_post_subtree(db, item_id).await?,
            ..Default::default()
        },
        ItemType::Thread => {
            let r = cascade::delete_thread(db, item_id).await?;
            RemovalOutcome {
                threads: r.threads,
                posts: r.posts,
                ..Default::default()
            }
        }
        ItemType::Forum => {
            let r = cascade::delete_forum(db, item_id).await?;
            RemovalOutcome {
                forums: r.forums,
                threads: r.threads,
                posts: r.posts,
                hidden: false,
            }
        }
        ItemType::Announcement | ItemType::Event | ItemType::User => RemovalOutcome {
            hidden: item::set_hidden(db, item_type, item_id, true).await?,
            ..Default::default()
        },
    };
    Ok(outcome)
}

async fn notify_outcome<C>(
    db: &C,
    caps: &Capabilities,
    report: &reports::Model,
    action: ResolveAction,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let what = format!("{} #{}", report.item_type, report.item_id);

    let (reporter_msg, reported_msg) = match action {
        ResolveAction::Retain => (
            format!("Your report on {} was resolved; the content stays up", what),
            Some(format!(
                "Your {} was reported and reviewed. Please follow the community guidelines",
                what
            )),
        ),
        ResolveAction::Dismiss => (
            format!("Your report on {} was dismissed", what),
            None,
        ),
        ResolveAction::Remove => (
            format!("Your report on {} was resolved; the content was removed", what),
            Some(format!(
                "Your {} was removed for violating the community guidelines",
                what
            )),
        ),
        _ => return Ok(()),
    };

    notifications::create_notification(
        db,
        report.reporter_id,
        Some(caps.user_id),
        NotificationType::ReportResolved,
        Some(report.id),
        &reporter_msg,
    )
    .await?;

    if let (Some(msg), Some(user_id)) = (reported_msg, report.reported_user_id) {
        notifications::create_notification(
            db,
            user_id,
            Some(caps.user_id),
            NotificationType::ModerationNotice,
            Some(report.id),
            &msg,
        )
        .await?;
    }

    Ok(())
}

pub async fn resolve_report(
    db: &DatabaseConnection,
    caps: &Capabilities,
    report_id: i32,
    input: ResolveReport,
) -> ApiResult<ResolvedReport> {
    let action = ResolveAction::parse(input.action.trim())
        .ok_or_else(|| ApiError::bad_request("Invalid action"))?;
    let notes = input
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let report = reports::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    if !caps.can_moderate(report.community_id) {
        return Err(ApiError::forbidden("Moderation rights required"));
    }

    let current = ReportStatus::parse(&report.status).unwrap_or_else(|| {
        log::warn!(
            "Report {} has unknown status {:?}; treating it as pending",
            report.id,
            report.status
        );
        ReportStatus::Pending
    });
    let item_type = ItemType::parse(&report.item_type)
        .ok_or_else(|| ApiError::bad_request("Report targets an unknown item type"))?;
    let now = Utc::now().naive_utc();

    match check_transition(current, action) {
        Transition::Invalid => {
            return Err(ApiError::conflict(format!(
                "Cannot {} a report that is {}",
                action.as_str(),
                current.as_str()
            )))
        }
        Transition::Repeat => {
            let mut active: reports::ActiveModel = report.into();
            active.resolution_notes = Set(notes);
            active.updated_at = Set(now);
            let report = active.update(db).await?;
            log::debug!("Report {} already {}; notes updated", report.id, report.status);
            return Ok(ResolvedReport {
                report: report.into(),
                action,
                changed: false,
                removed: None,
            });
        }
        Transition::Apply => {}
    }

    let txn = db.begin().await?;

    let mut removed = None;
    match action {
        ResolveAction::Review => {}
        ResolveAction::Hide => {
            item::set_hidden(&txn, item_type, report.item_id, true).await?;
        }
        ResolveAction::Restore | ResolveAction::Retain | ResolveAction::Dismiss => {
            item::set_hidden(&txn, item_type, report.item_id, false).await?;
        }
        ResolveAction::Remove => {
            removed = Some(remove_item(&txn, item_type, report.item_id).await?);
        }
    }

    let target = action.target_status();
    let mut active: reports::ActiveModel = report.into();
    active.status = Set(target.as_str().to_string());
    active.resolved_by = Set(Some(caps.user_id));
    active.resolved_at = Set(if target.is_terminal() { Some(now) } else { None });
    active.resolution_notes = Set(notes);
    active.updated_at = Set(now);
    let report = active.update(&txn).await?;

    notify_outcome(&txn, caps, &report, action).await?;

    txn.commit().await?;

    log::info!(
        "User {} applied {} to report {} ({} {}); status now {}",
        caps.user_id,
        action.as_str(),
        report.id,
        report.item_type,
        report.item_id,
        report.status
    );

    Ok(ResolvedReport {
        report: report.into(),
        action,
        changed: true,
        removed,
    })
}
