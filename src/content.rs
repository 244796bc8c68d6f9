//! Communities and the content inside them. Listing queries never return
//! hidden rows.

use crate::auth::{AmbassadorRole, Capabilities};
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::{ambassadors, announcements, communities, events, forums, posts, threads};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

const MAX_TITLE_LENGTH: usize = 200;

#[derive(Clone, Debug, Serialize)]
pub struct CommunityView {
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<communities::Model> for CommunityView {
    fn from(m: communities::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            kind: m.kind,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ForumView {
    pub id: i32,
    pub community_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<forums::Model> for ForumView {
    fn from(m: forums::Model) -> Self {
        Self {
            id: m.id,
            community_id: m.community_id,
            title: m.title,
            description: m.description,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ThreadView {
    pub id: i32,
    pub forum_id: i32,
    pub user_id: i32,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

impl From<threads::Model> for ThreadView {
    fn from(m: threads::Model) -> Self {
        Self {
            id: m.id,
            forum_id: m.forum_id,
            user_id: m.user_id,
            title: m.title,
            body: m.body,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PostView {
    pub id: i32,
    pub thread_id: i32,
    pub user_id: i32,
    pub reply_to: Option<i32>,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: NaiveDateTime,
}

impl From<posts::Model> for PostView {
    fn from(m: posts::Model) -> Self {
        Self {
            id: m.id,
            thread_id: m.thread_id,
            user_id: m.user_id,
            reply_to: m.reply_to,
            content: m.content,
            upvotes: m.upvotes,
            downvotes: m.downvotes,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ThreadDetail {
    pub thread: ThreadView,
    pub posts: Vec<PostView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnnouncementView {
    pub id: i32,
    pub community_id: i32,
    pub user_id: i32,
    pub title: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

impl From<announcements::Model> for AnnouncementView {
    fn from(m: announcements::Model) -> Self {
        Self {
            id: m.id,
            community_id: m.community_id,
            user_id: m.user_id,
            title: m.title,
            body: m.body,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EventView {
    pub id: i32,
    pub community_id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl From<events::Model> for EventView {
    fn from(m: events::Model) -> Self {
        Self {
            id: m.id,
            community_id: m.community_id,
            user_id: m.user_id,
            title: m.title,
            description: m.description,
            location: m.location,
            starts_at: m.starts_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewCommunity {
    pub name: String,
    pub kind: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewForum {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewThread {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub content: String,
    pub reply_to: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewAnnouncement {
    pub title: String,
    pub body: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `YYYY-MM-DDTHH:MM[:SS]` or with a space instead of `T`.
    pub starts_at: String,
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn required_body(body: &str, max_len: usize) -> ApiResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }
    if body.chars().count() > max_len {
        return Err(ApiError::bad_request(format!(
            "Content must be at most {} characters",
            max_len
        )));
    }
    Ok(body.to_string())
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

async fn find_community<C>(db: &C, community_id: i32) -> ApiResult<communities::Model>
where
    C: ConnectionTrait,
{
    communities::Entity::find_by_id(community_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Community not found"))
}

async fn visible_forum<C>(db: &C, forum_id: i32) -> ApiResult<forums::Model>
where
    C: ConnectionTrait,
{
    forums::Entity::find_by_id(forum_id)
        .one(db)
        .await?
        .filter(|f| !f.is_hidden)
        .ok_or_else(|| ApiError::not_found("Forum not found"))
}

async fn visible_thread<C>(db: &C, thread_id: i32) -> ApiResult<threads::Model>
where
    C: ConnectionTrait,
{
    let thread = threads::Entity::find_by_id(thread_id)
        .one(db)
        .await?
        .filter(|t| !t.is_hidden)
        .ok_or_else(|| ApiError::not_found("Thread not found"))?;
    visible_forum(db, thread.forum_id)
        .await
        .map_err(|_| ApiError::not_found("Thread not found"))?;
    Ok(thread)
}

/// Groups may be founded by anyone, who becomes the group's admin.
/// Universities are created by super-admins.
pub async fn create_community(
    db: &DatabaseConnection,
    caps: &Capabilities,
    input: &NewCommunity,
) -> ApiResult<CommunityView> {
    let name = required_title(&input.name)?;
    let kind = match input.kind.trim() {
        "" | "group" => "group",
        "university" => "university",
        _ => return Err(ApiError::bad_request("Kind must be 'university' or 'group'")),
    };
    if kind == "university" && !caps.is_super_admin() {
        return Err(ApiError::forbidden(
            "Only super-admins can create university communities",
        ));
    }

    let txn = db.begin().await?;

    let community = communities::ActiveModel {
        name: Set(name),
        kind: Set(kind.to_string()),
        description: Set(optional(&input.description)),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if kind == "group" {
        ambassadors::ActiveModel {
            user_id: Set(caps.user_id),
            community_id: Set(community.id),
            role: Set(AmbassadorRole::Admin.as_str().to_string()),
            created_at: Set(community.created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    log::info!(
        "User {} created {} community {}",
        caps.user_id,
        kind,
        community.id
    );
    Ok(community.into())
}

pub async fn list_communities<C>(db: &C) -> Result<Vec<CommunityView>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(communities::Entity::find()
        .order_by_asc(communities::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(CommunityView::from)
        .collect())
}

pub async fn create_forum<C>(
    db: &C,
    caps: &Capabilities,
    community_id: i32,
    input: &NewForum,
) -> ApiResult<ForumView>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    if !caps.can_moderate(Some(community_id)) {
        return Err(ApiError::forbidden("Moderation rights required"));
    }

    let forum = forums::ActiveModel {
        community_id: Set(community_id),
        title: Set(required_title(&input.title)?),
        description: Set(optional(&input.description)),
        created_by: Set(Some(caps.user_id)),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(forum.into())
}

pub async fn list_forums<C>(db: &C, community_id: i32) -> ApiResult<Vec<ForumView>>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    Ok(forums::Entity::find()
        .filter(forums::Column::CommunityId.eq(community_id))
        .filter(forums::Column::IsHidden.eq(false))
        .order_by_asc(forums::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(ForumView::from)
        .collect())
}

pub async fn create_thread<C>(
    db: &C,
    caps: &Capabilities,
    forum_id: i32,
    input: &NewThread,
    max_len: usize,
) -> ApiResult<ThreadView>
where
    C: ConnectionTrait,
{
    visible_forum(db, forum_id).await?;

    let thread = threads::ActiveModel {
        forum_id: Set(forum_id),
        user_id: Set(caps.user_id),
        title: Set(required_title(&input.title)?),
        body: Set(required_body(&input.body, max_len)?),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(thread.into())
}

pub async fn list_threads<C>(db: &C, forum_id: i32) -> ApiResult<Vec<ThreadView>>
where
    C: ConnectionTrait,
{
    visible_forum(db, forum_id).await?;
    Ok(threads::Entity::find()
        .filter(threads::Column::ForumId.eq(forum_id))
        .filter(threads::Column::IsHidden.eq(false))
        .order_by_desc(threads::Column::CreatedAt)
        .order_by_desc(threads::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(ThreadView::from)
        .collect())
}

pub async fn get_thread<C>(db: &C, thread_id: i32) -> ApiResult<ThreadDetail>
where
    C: ConnectionTrait,
{
    let thread = visible_thread(db, thread_id).await?;
    let posts = posts::Entity::find()
        .filter(posts::Column::ThreadId.eq(thread_id))
        .filter(posts::Column::IsHidden.eq(false))
        .order_by_asc(posts::Column::CreatedAt)
        .order_by_asc(posts::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(PostView::from)
        .collect();

    Ok(ThreadDetail {
        thread: thread.into(),
        posts,
    })
}

/// Adds a post to a thread. A reply notifies the author of the parent post.
pub async fn create_post<C>(
    db: &C,
    caps: &Capabilities,
    thread_id: i32,
    input: &NewPost,
    max_len: usize,
) -> ApiResult<PostView>
where
    C: ConnectionTrait,
{
    visible_thread(db, thread_id).await?;
    let content = required_body(&input.content, max_len)?;

    let parent = match input.reply_to {
        Some(parent_id) => Some(
            posts::Entity::find_by_id(parent_id)
                .one(db)
                .await?
                .filter(|p| p.thread_id == thread_id && !p.is_hidden)
                .ok_or_else(|| ApiError::bad_request("Parent post is not in this thread"))?,
        ),
        None => None,
    };

    let post = posts::ActiveModel {
        thread_id: Set(thread_id),
        user_id: Set(caps.user_id),
        reply_to: Set(parent.as_ref().map(|p| p.id)),
        content: Set(content),
        upvotes: Set(0),
        downvotes: Set(0),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if let Some(parent) = parent {
        if parent.user_id != caps.user_id {
            notifications::create_notification(
                db,
                parent.user_id,
                Some(caps.user_id),
                NotificationType::Reply,
                Some(post.id),
                &format!("{} replied to your post", caps.username),
            )
            .await?;
        }
    }

    Ok(post.into())
}

pub async fn create_announcement<C>(
    db: &C,
    caps: &Capabilities,
    community_id: i32,
    input: &NewAnnouncement,
    max_len: usize,
) -> ApiResult<AnnouncementView>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    if !caps.can_moderate(Some(community_id)) {
        return Err(ApiError::forbidden("Moderation rights required"));
    }

    let announcement = announcements::ActiveModel {
        community_id: Set(community_id),
        user_id: Set(caps.user_id),
        title: Set(required_title(&input.title)?),
        body: Set(required_body(&input.body, max_len)?),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(announcement.into())
}

pub async fn list_announcements<C>(db: &C, community_id: i32) -> ApiResult<Vec<AnnouncementView>>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    Ok(announcements::Entity::find()
        .filter(announcements::Column::CommunityId.eq(community_id))
        .filter(announcements::Column::IsHidden.eq(false))
        .order_by_desc(announcements::Column::CreatedAt)
        .order_by_desc(announcements::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(AnnouncementView::from)
        .collect())
}

pub async fn create_event<C>(
    db: &C,
    caps: &Capabilities,
    community_id: i32,
    input: &NewEvent,
) -> ApiResult<EventView>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    if !caps.can_moderate(Some(community_id)) {
        return Err(ApiError::forbidden("Moderation rights required"));
    }
    let starts_at = parse_datetime(&input.starts_at)
        .ok_or_else(|| ApiError::bad_request("starts_at must be a date and time"))?;

    let event = events::ActiveModel {
        community_id: Set(community_id),
        user_id: Set(caps.user_id),
        title: Set(required_title(&input.title)?),
        description: Set(optional(&input.description)),
        location: Set(optional(&input.location)),
        starts_at: Set(starts_at),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(event.into())
}

/// Events of a community, soonest first.
pub async fn list_events<C>(db: &C, community_id: i32) -> ApiResult<Vec<EventView>>
where
    C: ConnectionTrait,
{
    find_community(db, community_id).await?;
    Ok(events::Entity::find()
        .filter(events::Column::CommunityId.eq(community_id))
        .filter(events::Column::IsHidden.eq(false))
        .order_by_asc(events::Column::StartsAt)
        .all(db)
        .await?
        .into_iter()
        .map(EventView::from)
        .collect())
}
