//! Mutual connections between users: a request from one side, accepted by
//! the other.

use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::{connections, users};
use chrono::Utc;
use sea_orm::{entity::*, query::*, sea_query::Expr, Condition, ConnectionTrait, DbErr, Set};
use serde::Serialize;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

#[derive(Clone, Debug, Serialize)]
pub struct ConnectionView {
    pub id: i32,
    /// The other party.
    pub user_id: i32,
    pub username: String,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
    pub accepted_at: Option<chrono::NaiveDateTime>,
}

fn between(a: i32, b: i32) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(connections::Column::RequesterId.eq(a))
                .add(connections::Column::AddresseeId.eq(b)),
        )
        .add(
            Condition::all()
                .add(connections::Column::RequesterId.eq(b))
                .add(connections::Column::AddresseeId.eq(a)),
        )
}

async fn view_for<C>(db: &C, me: i32, row: connections::Model) -> Result<ConnectionView, DbErr>
where
    C: ConnectionTrait,
{
    let other = if row.requester_id == me {
        row.addressee_id
    } else {
        row.requester_id
    };
    let username = users::Entity::find_by_id(other)
        .one(db)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();

    Ok(ConnectionView {
        id: row.id,
        user_id: other,
        username,
        status: row.status,
        created_at: row.created_at,
        accepted_at: row.accepted_at,
    })
}

pub async fn are_connected<C>(db: &C, a: i32, b: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(connections::Entity::find()
        .filter(between(a, b))
        .filter(connections::Column::Status.eq(STATUS_ACCEPTED))
        .one(db)
        .await?
        .is_some())
}

pub async fn request_connection<C>(
    db: &C,
    caps: &Capabilities,
    addressee_id: i32,
) -> ApiResult<ConnectionView>
where
    C: ConnectionTrait,
{
    if addressee_id == caps.user_id {
        return Err(ApiError::bad_request("You cannot connect with yourself"));
    }
    if users::Entity::find_by_id(addressee_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    if connections::Entity::find()
        .filter(between(caps.user_id, addressee_id))
        .one(db)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Connection already exists"));
    }

    let row = connections::ActiveModel {
        requester_id: Set(caps.user_id),
        addressee_id: Set(addressee_id),
        status: Set(STATUS_PENDING.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        accepted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    notifications::create_notification(
        db,
        addressee_id,
        Some(caps.user_id),
        NotificationType::ConnectionRequest,
        Some(row.id),
        &format!("{} wants to connect with you", caps.username),
    )
    .await?;

    Ok(view_for(db, caps.user_id, row).await?)
}

/// Only the addressee of a pending request may accept it.
pub async fn accept_connection<C>(
    db: &C,
    caps: &Capabilities,
    connection_id: i32,
) -> ApiResult<ConnectionView>
where
    C: ConnectionTrait,
{
    let row = connections::Entity::find_by_id(connection_id)
        .one(db)
        .await?
        .filter(|c| c.addressee_id == caps.user_id)
        .ok_or_else(|| ApiError::not_found("Connection request not found"))?;

    if row.status != STATUS_PENDING {
        return Err(ApiError::conflict("Connection is already accepted"));
    }

    connections::Entity::update_many()
        .col_expr(connections::Column::Status, Expr::value(STATUS_ACCEPTED))
        .col_expr(
            connections::Column::AcceptedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(connections::Column::Id.eq(row.id))
        .exec(db)
        .await?;

    notifications::create_notification(
        db,
        row.requester_id,
        Some(caps.user_id),
        NotificationType::ConnectionAccepted,
        Some(row.id),
        &format!("{} accepted your connection request", caps.username),
    )
    .await?;

    let row = connections::Entity::find_by_id(connection_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Connection request not found"))?;
    Ok(view_for(db, caps.user_id, row).await?)
}

/// Declines, cancels or removes a connection. Either party may do this.
pub async fn remove_connection<C>(db: &C, caps: &Capabilities, connection_id: i32) -> ApiResult<()>
where
    C: ConnectionTrait,
{
    let res = connections::Entity::delete_many()
        .filter(connections::Column::Id.eq(connection_id))
        .filter(
            Condition::any()
                .add(connections::Column::RequesterId.eq(caps.user_id))
                .add(connections::Column::AddresseeId.eq(caps.user_id)),
        )
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Connection not found"));
    }
    Ok(())
}

pub async fn list_connections<C>(db: &C, user_id: i32) -> Result<Vec<ConnectionView>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = connections::Entity::find()
        .filter(connections::Column::Status.eq(STATUS_ACCEPTED))
        .filter(
            Condition::any()
                .add(connections::Column::RequesterId.eq(user_id))
                .add(connections::Column::AddresseeId.eq(user_id)),
        )
        .order_by_desc(connections::Column::AcceptedAt)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(view_for(db, user_id, row).await?);
    }
    Ok(out)
}

/// Requests waiting on the user's answer.
pub async fn list_pending<C>(db: &C, user_id: i32) -> Result<Vec<ConnectionView>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = connections::Entity::find()
        .filter(connections::Column::Status.eq(STATUS_PENDING))
        .filter(connections::Column::AddresseeId.eq(user_id))
        .order_by_desc(connections::Column::CreatedAt)
        .all(db)
        .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(view_for(db, user_id, row).await?);
    }
    Ok(out)
}
