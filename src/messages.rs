//! Direct messages between two users.

use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::{messages, users};
use crate::paging::page_offset;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, Condition, ConnectionTrait, DbErr, PaginatorTrait, Set,
};

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 5_000;

pub async fn send_message<C>(
    db: &C,
    caps: &Capabilities,
    recipient_id: i32,
    content: &str,
) -> ApiResult<messages::Model>
where
    C: ConnectionTrait,
{
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Message cannot be empty"));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    if recipient_id == caps.user_id {
        return Err(ApiError::bad_request("You cannot message yourself"));
    }
    if users::Entity::find_by_id(recipient_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Recipient not found"));
    }

    let message = messages::ActiveModel {
        sender_id: Set(caps.user_id),
        recipient_id: Set(recipient_id),
        content: Set(content.to_string()),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    notifications::create_notification(
        db,
        recipient_id,
        Some(caps.user_id),
        NotificationType::Message,
        Some(message.id),
        &format!("New message from {}", caps.username),
    )
    .await?;

    Ok(message)
}

/// One page of the conversation between `user_id` and `other_id`, oldest
/// first. Page numbers start at 1 and count back from the newest message.
pub async fn conversation<C>(
    db: &C,
    user_id: i32,
    other_id: i32,
    page: u64,
    page_size: u64,
) -> ApiResult<Vec<messages::Model>>
where
    C: ConnectionTrait,
{
    let offset = page_offset(page, page_size)?;
    let mut rows = messages::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(messages::Column::SenderId.eq(user_id))
                        .add(messages::Column::RecipientId.eq(other_id)),
                )
                .add(
                    Condition::all()
                        .add(messages::Column::SenderId.eq(other_id))
                        .add(messages::Column::RecipientId.eq(user_id)),
                ),
        )
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?;

    rows.reverse();
    Ok(rows)
}

/// Marks everything `other_id` sent to `user_id` as read.
pub async fn mark_conversation_read<C>(db: &C, user_id: i32, other_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let res = messages::Entity::update_many()
        .col_expr(messages::Column::IsRead, Expr::value(true))
        .filter(messages::Column::SenderId.eq(other_id))
        .filter(messages::Column::RecipientId.eq(user_id))
        .filter(messages::Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn unread_count<C>(db: &C, user_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    messages::Entity::find()
        .filter(messages::Column::RecipientId.eq(user_id))
        .filter(messages::Column::IsRead.eq(false))
        .count(db)
        .await
        .map(|n| n as u64)
}
