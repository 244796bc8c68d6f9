//! Community ambassadors: users with moderation authority over one
//! community.

use crate::auth::{AmbassadorRole, Capabilities};
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::{ambassadors, communities, users};
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, Set};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct AmbassadorView {
    pub user_id: i32,
    pub username: String,
    pub community_id: i32,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
}

/// User ids of every ambassador of a community, oldest appointment first.
pub async fn ambassador_user_ids<C>(db: &C, community_id: i32) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = ambassadors::Entity::find()
        .filter(ambassadors::Column::CommunityId.eq(community_id))
        .order_by_asc(ambassadors::Column::Id)
        .all(db)
        .await?;

    let mut ids: Vec<i32> = Vec::with_capacity(rows.len());
    for row in rows {
        if !ids.contains(&row.user_id) {
            ids.push(row.user_id);
        }
    }
    Ok(ids)
}

pub async fn is_ambassador<C>(db: &C, user_id: i32, community_id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(ambassadors::Entity::find()
        .filter(ambassadors::Column::UserId.eq(user_id))
        .filter(ambassadors::Column::CommunityId.eq(community_id))
        .one(db)
        .await?
        .is_some())
}

pub async fn list_ambassadors<C>(db: &C, community_id: i32) -> Result<Vec<AmbassadorView>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = ambassadors::Entity::find()
        .filter(ambassadors::Column::CommunityId.eq(community_id))
        .find_also_related(users::Entity)
        .order_by_asc(ambassadors::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(a, user)| AmbassadorView {
            user_id: a.user_id,
            username: user.map(|u| u.username).unwrap_or_default(),
            community_id: a.community_id,
            role: a.role,
            created_at: a.created_at,
        })
        .collect())
}

/// Appoints an ambassador. Community admins may appoint moderators; only
/// super-admins may appoint admins.
pub async fn add_ambassador<C>(
    db: &C,
    caps: &Capabilities,
    community_id: i32,
    user_id: i32,
    role: &str,
) -> ApiResult<AmbassadorView>
where
    C: ConnectionTrait,
{
    let role = AmbassadorRole::parse(role.trim())
        .ok_or_else(|| ApiError::bad_request("Role must be 'admin' or 'moderator'"))?;

    if communities::Entity::find_by_id(community_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("Community not found"));
    }

    if !caps.is_community_admin(community_id) {
        return Err(ApiError::forbidden("Community admin rights required"));
    }
    if role == AmbassadorRole::Admin && !caps.is_super_admin() {
        return Err(ApiError::forbidden("Only super-admins can appoint admins"));
    }

    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if is_ambassador(db, user_id, community_id).await? {
        return Err(ApiError::conflict("User is already an ambassador"));
    }

    let row = ambassadors::ActiveModel {
        user_id: Set(user_id),
        community_id: Set(community_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    notifications::create_notification(
        db,
        user_id,
        Some(caps.user_id),
        NotificationType::AmbassadorAdded,
        Some(community_id),
        &format!("You are now a community {}", role.as_str()),
    )
    .await?;

    log::info!(
        "User {} appointed {} as {} of community {}",
        caps.user_id,
        user_id,
        role.as_str(),
        community_id
    );

    Ok(AmbassadorView {
        user_id,
        username: user.username,
        community_id,
        role: row.role,
        created_at: row.created_at,
    })
}

/// Removes a moderator. Admins cannot be removed through this path.
pub async fn remove_ambassador<C>(
    db: &C,
    caps: &Capabilities,
    community_id: i32,
    user_id: i32,
) -> ApiResult<()>
where
    C: ConnectionTrait,
{
    if !caps.is_community_admin(community_id) {
        return Err(ApiError::forbidden("Community admin rights required"));
    }

    let rows = ambassadors::Entity::find()
        .filter(ambassadors::Column::UserId.eq(user_id))
        .filter(ambassadors::Column::CommunityId.eq(community_id))
        .all(db)
        .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("Ambassador not found"));
    }
    if rows
        .iter()
        .any(|r| r.role == AmbassadorRole::Admin.as_str())
    {
        return Err(ApiError::forbidden("Community admins cannot be removed"));
    }

    ambassadors::Entity::delete_many()
        .filter(ambassadors::Column::UserId.eq(user_id))
        .filter(ambassadors::Column::CommunityId.eq(community_id))
        .exec(db)
        .await?;

    log::info!(
        "User {} removed moderator {} from community {}",
        caps.user_id,
        user_id,
        community_id
    );
    Ok(())
}
