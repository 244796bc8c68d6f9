//! Notification storage: one row per recipient, no delivery guarantees
//! beyond insertion order.

pub mod types;

use crate::orm::notifications;
use chrono::Utc;
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr, PaginatorTrait, Set};

pub use types::NotificationType;

/// Create a notification for a user
pub async fn create_notification<C>(
    db: &C,
    recipient_id: i32,
    actor_id: Option<i32>,
    notification_type: NotificationType,
    reference_id: Option<i32>,
    message: &str,
) -> Result<i32, DbErr>
where
    C: ConnectionTrait,
{
    let notification = notifications::ActiveModel {
        recipient_id: Set(recipient_id),
        actor_id: Set(actor_id),
        type_: Set(notification_type.as_str().to_string()),
        reference_id: Set(reference_id),
        message: Set(message.to_string()),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    let result = notification.insert(db).await?;
    Ok(result.id)
}

/// Create the same notification for each recipient, in order.
pub async fn notify_many<C>(
    db: &C,
    recipients: &[i32],
    actor_id: Option<i32>,
    notification_type: NotificationType,
    reference_id: Option<i32>,
    message: &str,
) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    for &recipient_id in recipients {
        create_notification(
            db,
            recipient_id,
            actor_id,
            notification_type,
            reference_id,
            message,
        )
        .await?;
    }

    if !recipients.is_empty() {
        log::debug!(
            "Sent {} {} notification(s)",
            recipients.len(),
            notification_type.as_str()
        );
    }

    Ok(recipients.len())
}

/// Count unread notifications for a user
pub async fn count_unread<C>(db: &C, user_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(db)
        .await
        .map(|n| n as u64)
}

/// Fetch recent notifications for a user, newest first
pub async fn list_notifications<C>(
    db: &C,
    user_id: i32,
    limit: u64,
) -> Result<Vec<notifications::Model>, DbErr>
where
    C: ConnectionTrait,
{
    notifications::Entity::find()
        .filter(notifications::Column::RecipientId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .order_by_desc(notifications::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// Mark a notification as read. Returns false when the notification does not
/// belong to the user.
pub async fn mark_read<C>(db: &C, notification_id: i32, user_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let res = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::RecipientId.eq(user_id))
        .exec(db)
        .await?;

    Ok(res.rows_affected > 0)
}

/// Delete one of the user's notifications.
pub async fn delete_notification<C>(
    db: &C,
    notification_id: i32,
    user_id: i32,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let res = notifications::Entity::delete_many()
        .filter(notifications::Column::Id.eq(notification_id))
        .filter(notifications::Column::RecipientId.eq(user_id))
        .exec(db)
        .await?;

    Ok(res.rows_affected > 0)
}

/// "Mark all read" clears the inbox: every notification of the user is deleted.
pub async fn mark_all_read<C>(db: &C, user_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let res = notifications::Entity::delete_many()
        .filter(notifications::Column::RecipientId.eq(user_id))
        .exec(db)
        .await?;

    Ok(res.rows_affected)
}
