//! Follows and the thread feed built from them.

use crate::auth::Capabilities;
use crate::content::ThreadView;
use crate::error::{ApiError, ApiResult};
use crate::orm::{communities, follows, forums, threads, users};
use crate::paging::page_offset;
use crate::settings::{self, FeedScope};
use chrono::Utc;
use sea_orm::{entity::*, query::*, Condition, ConnectionTrait, DbErr, JoinType, Set};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowTarget {
    Community,
    Forum,
    User,
}

impl FollowTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "community" => Some(Self::Community),
            "forum" => Some(Self::Forum),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Community => "community",
            Self::Forum => "forum",
            Self::User => "user",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FeedPage {
    pub scope: FeedScope,
    pub page: u64,
    pub threads: Vec<ThreadView>,
}

/// Ids a user follows, split by target type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Followed {
    pub communities: Vec<i32>,
    pub forums: Vec<i32>,
    pub users: Vec<i32>,
}

impl Followed {
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty() && self.forums.is_empty() && self.users.is_empty()
    }
}

async fn target_exists<C>(db: &C, target: FollowTarget, id: i32) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    Ok(match target {
        FollowTarget::Community => communities::Entity::find_by_id(id).one(db).await?.is_some(),
        FollowTarget::Forum => forums::Entity::find_by_id(id)
            .one(db)
            .await?
            .map_or(false, |f| !f.is_hidden),
        FollowTarget::User => users::Entity::find_by_id(id)
            .one(db)
            .await?
            .map_or(false, |u| !u.is_hidden),
    })
}

pub async fn follow<C>(db: &C, caps: &Capabilities, target_type: &str, target_id: i32) -> ApiResult<()>
where
    C: ConnectionTrait,
{
    let target = FollowTarget::parse(target_type.trim())
        .ok_or_else(|| ApiError::bad_request("Target must be 'community', 'forum' or 'user'"))?;
    if target == FollowTarget::User && target_id == caps.user_id {
        return Err(ApiError::bad_request("You cannot follow yourself"));
    }
    if !target_exists(db, target, target_id).await? {
        return Err(ApiError::not_found(format!("{} not found", target.as_str())));
    }

    let existing = follows::Entity::find()
        .filter(follows::Column::UserId.eq(caps.user_id))
        .filter(follows::Column::TargetType.eq(target.as_str()))
        .filter(follows::Column::TargetId.eq(target_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Already following"));
    }

    follows::ActiveModel {
        user_id: Set(caps.user_id),
        target_type: Set(target.as_str().to_string()),
        target_id: Set(target_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

pub async fn unfollow<C>(
    db: &C,
    caps: &Capabilities,
    target_type: &str,
    target_id: i32,
) -> ApiResult<()>
where
    C: ConnectionTrait,
{
    let target = FollowTarget::parse(target_type.trim())
        .ok_or_else(|| ApiError::bad_request("Target must be 'community', 'forum' or 'user'"))?;

    let res = follows::Entity::delete_many()
        .filter(follows::Column::UserId.eq(caps.user_id))
        .filter(follows::Column::TargetType.eq(target.as_str()))
        .filter(follows::Column::TargetId.eq(target_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Not following"));
    }
    Ok(())
}

pub async fn followed_by<C>(db: &C, user_id: i32) -> Result<Followed, DbErr>
where
    C: ConnectionTrait,
{
    let mut out = Followed::default();
    for row in follows::Entity::find()
        .filter(follows::Column::UserId.eq(user_id))
        .order_by_asc(follows::Column::Id)
        .all(db)
        .await?
    {
        match FollowTarget::parse(&row.target_type) {
            Some(FollowTarget::Community) => out.communities.push(row.target_id),
            Some(FollowTarget::Forum) => out.forums.push(row.target_id),
            Some(FollowTarget::User) => out.users.push(row.target_id),
            None => log::warn!("Ignoring follow {} with type {:?}", row.id, row.target_type),
        }
    }
    Ok(out)
}

/// Threads in followed forums, in forums of followed communities, or by
/// followed authors.
pub fn following_condition(followed: &Followed) -> Condition {
    let mut cond = Condition::any();
    if !followed.forums.is_empty() {
        cond = cond.add(threads::Column::ForumId.is_in(followed.forums.clone()));
    }
    if !followed.communities.is_empty() {
        cond = cond.add(forums::Column::CommunityId.is_in(followed.communities.clone()));
    }
    if !followed.users.is_empty() {
        cond = cond.add(threads::Column::UserId.is_in(followed.users.clone()));
    }
    cond
}

/// One page of visible threads, newest first. Without an explicit scope the
/// user's `default_feed` setting applies.
pub async fn fetch_feed<C>(
    db: &C,
    user_id: i32,
    scope: Option<FeedScope>,
    page: u64,
    page_size: u64,
) -> ApiResult<FeedPage>
where
    C: ConnectionTrait,
{
    let scope = match scope {
        Some(scope) => scope,
        None => settings::get_settings(db, user_id).await?.default_feed,
    };
    let page = page.max(1);
    let offset = page_offset(page, page_size)?;

    let mut query = threads::Entity::find()
        .join(JoinType::InnerJoin, threads::Relation::Forum.def())
        .filter(threads::Column::IsHidden.eq(false))
        .filter(forums::Column::IsHidden.eq(false));

    if scope == FeedScope::Following {
        let followed = followed_by(db, user_id).await?;
        if followed.is_empty() {
            return Ok(FeedPage {
                scope,
                page,
                threads: Vec::new(),
            });
        }
        query = query.filter(following_condition(&followed));
    }

    let threads = query
        .order_by_desc(threads::Column::CreatedAt)
        .order_by_desc(threads::Column::Id)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?
        .into_iter()
        .map(ThreadView::from)
        .collect();

    Ok(FeedPage {
        scope,
        page,
        threads,
    })
}
