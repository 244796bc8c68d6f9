//! Report intake: validation, context resolution, auto-hide and moderator
//! fan-out.

use super::item::{self, ItemType};
use super::{select_recipients, ReportStatus, ReportView, Severity};
use crate::ambassadors;
use crate::app_config::ModerationConfig;
use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::reports;
use crate::user;
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection, Set, TransactionTrait};
use serde::Serialize;
use std::collections::HashSet;

/// Newest reports returned by a listing.
const LIST_LIMIT: u64 = 100;

#[derive(Clone, Debug, Default)]
pub struct SubmitReport {
    pub item_type: String,
    pub item_id: Option<i32>,
    pub reason_code: String,
    pub reason_text: Option<String>,
    pub details: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubmittedReport {
    pub report: ReportView,
    /// Whether this submission tripped the auto-hide rule.
    pub auto_hidden: bool,
    /// Moderators notified about the report.
    pub notified: usize,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn submit_report(
    db: &DatabaseConnection,
    caps: &Capabilities,
    input: SubmitReport,
    policy: &ModerationConfig,
) -> ApiResult<SubmittedReport> {
    let item_type = ItemType::parse(input.item_type.trim())
        .ok_or_else(|| ApiError::bad_request("Invalid item type"))?
        .canonical();
    let item_id = match input.item_id {
        Some(id) if id > 0 => id,
        _ => return Err(ApiError::bad_request("Item id is required")),
    };
    let reason_code = input.reason_code.trim().to_lowercase();
    if reason_code.is_empty() {
        return Err(ApiError::bad_request("Reason is required"));
    }
    if reason_code.len() > 64 {
        return Err(ApiError::bad_request("Reason code is too long"));
    }
    let details = non_empty(input.details);
    if let Some(details) = &details {
        if details.chars().count() > policy.max_report_details {
            return Err(ApiError::bad_request(format!(
                "Details must be at most {} characters",
                policy.max_report_details
            )));
        }
    }

    let open_statuses = [
        ReportStatus::Pending.as_str(),
        ReportStatus::UnderReview.as_str(),
    ];
    let same_item = reports::Column::ItemType.is_in(item_type.stored_names().iter().copied());
    let duplicate = reports::Entity::find()
        .filter(same_item.clone())
        .filter(reports::Column::ItemId.eq(item_id))
        .filter(reports::Column::ReporterId.eq(caps.user_id))
        .filter(reports::Column::Status.is_in(open_statuses))
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("You have already reported this item"));
    }

    let ctx = item::resolve_context(db, item_type, item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Reported item not found"))?;
    let severity = Severity::from_reason_code(&reason_code);
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    let report = reports::ActiveModel {
        item_type: Set(item_type.as_str().to_string()),
        item_id: Set(item_id),
        forum_id: Set(ctx.forum_id),
        thread_id: Set(ctx.thread_id),
        community_id: Set(ctx.community_id),
        reported_user_id: Set(ctx.reported_user_id),
        reporter_id: Set(caps.user_id),
        reason_code: Set(reason_code),
        reason_text: Set(non_empty(input.reason_text)),
        severity: Set(severity.as_str().to_string()),
        details: Set(details),
        status: Set(ReportStatus::Pending.as_str().to_string()),
        resolved_by: Set(None),
        resolved_at: Set(None),
        resolution_notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let reporters: HashSet<i32> = reports::Entity::find()
        .filter(same_item)
        .filter(reports::Column::ItemId.eq(item_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.reporter_id)
        .collect();

    let auto_hidden = severity.escalates()
        || reporters.len() as u64 >= policy.auto_hide_reporter_threshold;
    if auto_hidden {
        item::set_hidden(&txn, item_type, item_id, true).await?;
        log::info!(
            "Auto-hid {} {} ({} severity, {} reporter(s))",
            item_type.as_str(),
            item_id,
            severity.as_str(),
            reporters.len()
        );
    }

    let community_ambassadors = match ctx.community_id {
        Some(community_id) => ambassadors::ambassador_user_ids(&txn, community_id).await?,
        None => Vec::new(),
    };
    let reported_is_ambassador = ctx
        .reported_user_id
        .map_or(false, |id| community_ambassadors.contains(&id));
    let super_admins = if severity.escalates() || item_type == ItemType::User || reported_is_ambassador
    {
        user::super_admin_ids(&txn).await?
    } else {
        Vec::new()
    };

    let recipients = select_recipients(&community_ambassadors, &super_admins, caps.user_id);
    let notified = notifications::notify_many(
        &txn,
        &recipients,
        Some(caps.user_id),
        NotificationType::Report,
        Some(report.id),
        &format!(
            "New {} severity report on {} #{}",
            severity.as_str(),
            item_type.as_str(),
            item_id
        ),
    )
    .await?;

    txn.commit().await?;

    log::info!(
        "User {} reported {} {} for {} (report {})",
        caps.user_id,
        item_type.as_str(),
        item_id,
        report.reason_code,
        report.id
    );

    Ok(SubmittedReport {
        report: report.into(),
        auto_hidden,
        notified,
    })
}

/// Lists reports visible to the caller. `status` defaults to the open
/// statuses; `"all"` disables the filter.
pub async fn list_reports(
    db: &DatabaseConnection,
    caps: &Capabilities,
    status: Option<&str>,
) -> ApiResult<Vec<ReportView>> {
    let mut query = reports::Entity::find();

    if !caps.is_super_admin() {
        let communities: Vec<i32> = caps.ambassador_of.keys().copied().collect();
        if communities.is_empty() {
            return Err(ApiError::forbidden("Moderation rights required"));
        }
        query = query.filter(reports::Column::CommunityId.is_in(communities));
    }

    match status.map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            query = query.filter(reports::Column::Status.is_in([
                ReportStatus::Pending.as_str(),
                ReportStatus::UnderReview.as_str(),
            ]))
        }
        Some("all") => {}
        Some(s) => {
            let status =
                ReportStatus::parse(s).ok_or_else(|| ApiError::bad_request("Invalid status"))?;
            query = query.filter(reports::Column::Status.eq(status.as_str()));
        }
    }

    Ok(query
        .order_by_desc(reports::Column::CreatedAt)
        .order_by_desc(reports::Column::Id)
        .limit(LIST_LIMIT)
        .all(db)
        .await?
        .into_iter()
        .map(ReportView::from)
        .collect())
}

/// Moderators of the report's community and the reporter may read a report.
pub async fn get_report(
    db: &DatabaseConnection,
    caps: &Capabilities,
    report_id: i32,
) -> ApiResult<ReportView> {
    let report = reports::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    if report.reporter_id != caps.user_id && !caps.can_moderate(report.community_id) {
        return Err(ApiError::forbidden("Moderation rights required"));
    }

    Ok(report.into())
}
