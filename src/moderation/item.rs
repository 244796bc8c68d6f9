//! Reportable items and their denormalized context.

use crate::orm::{announcements, events, forums, posts, threads, users};
use sea_orm::{entity::*, query::*, sea_query::Expr, ConnectionTrait, DbErr};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Forum,
    Thread,
    Post,
    /// A reply post; stored in the posts table.
    Comment,
    Announcement,
    Event,
    User,
}

impl ItemType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "forum" => Some(Self::Forum),
            "thread" => Some(Self::Thread),
            "post" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            "announcement" => Some(Self::Announcement),
            "event" => Some(Self::Event),
            "user" => Some(Self::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forum => "forum",
            Self::Thread => "thread",
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Announcement => "announcement",
            Self::Event => "event",
            Self::User => "user",
        }
    }

    /// The type a report is filed under. Comments live in the posts table,
    /// so they share an identity with posts.
    pub fn canonical(&self) -> Self {
        match self {
            Self::Comment => Self::Post,
            other => *other,
        }
    }

    /// Stored type names that denote the same table row as this type.
    pub fn stored_names(&self) -> &'static [&'static str] {
        match self.canonical() {
            Self::Post => &["post", "comment"],
            Self::Forum => &["forum"],
            Self::Thread => &["thread"],
            Self::Announcement => &["announcement"],
            Self::Event => &["event"],
            Self::User => &["user"],
            Self::Comment => &["comment"],
        }
    }
}

/// Foreign keys copied onto a report so it can be routed and listed without
/// touching the target again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ItemContext {
    pub forum_id: Option<i32>,
    pub thread_id: Option<i32>,
    pub community_id: Option<i32>,
    pub reported_user_id: Option<i32>,
}

async fn forum_community<C>(db: &C, forum_id: i32) -> Result<Option<i32>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(forums::Entity::find_by_id(forum_id)
        .one(db)
        .await?
        .map(|f| f.community_id))
}

async fn thread_context<C>(db: &C, thread: &threads::Model) -> Result<ItemContext, DbErr>
where
    C: ConnectionTrait,
{
    Ok(ItemContext {
        forum_id: Some(thread.forum_id),
        thread_id: Some(thread.id),
        community_id: forum_community(db, thread.forum_id).await?,
        reported_user_id: Some(thread.user_id),
    })
}

/// Looks up the target item. `None` means it does not exist.
pub async fn resolve_context<C>(
    db: &C,
    item_type: ItemType,
    item_id: i32,
) -> Result<Option<ItemContext>, DbErr>
where
    C: ConnectionTrait,
{
    let ctx = match item_type {
        ItemType::Forum => match forums::Entity::find_by_id(item_id).one(db).await? {
            Some(forum) => ItemContext {
                forum_id: Some(forum.id),
                thread_id: None,
                community_id: Some(forum.community_id),
                reported_user_id: forum.created_by,
            },
            None => return Ok(None),
        },
        ItemType::Thread => match threads::Entity::find_by_id(item_id).one(db).await? {
            Some(thread) => thread_context(db, &thread).await?,
            None => return Ok(None),
        },
        ItemType::Post | ItemType::Comment => {
            let post = match posts::Entity::find_by_id(item_id).one(db).await? {
                Some(post) => post,
                None => return Ok(None),
            };
            let mut ctx = match threads::Entity::find_by_id(post.thread_id).one(db).await? {
                Some(thread) => thread_context(db, &thread).await?,
                None => ItemContext {
                    thread_id: Some(post.thread_id),
                    ..Default::default()
                },
            };
            ctx.reported_user_id = Some(post.user_id);
            ctx
        }
        ItemType::Announcement => {
            match announcements::Entity::find_by_id(item_id).one(db).await? {
                Some(a) => ItemContext {
                    community_id: Some(a.community_id),
                    reported_user_id: Some(a.user_id),
                    ..Default::default()
                },
                None => return Ok(None),
            }
        }
        ItemType::Event => match events::Entity::find_by_id(item_id).one(db).await? {
            Some(e) => ItemContext {
                community_id: Some(e.community_id),
                reported_user_id: Some(e.user_id),
                ..Default::default()
            },
            None => return Ok(None),
        },
        ItemType::User => match users::Entity::find_by_id(item_id).one(db).await? {
            Some(u) => ItemContext {
                reported_user_id: Some(u.id),
                ..Default::default()
            },
            None => return Ok(None),
        },
    };

    Ok(Some(ctx))
}

/// Sets the hidden flag of an item. Returns false when no row matched.
pub async fn set_hidden<C>(
    db: &C,
    item_type: ItemType,
    item_id: i32,
    hidden: bool,
) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let rows = match item_type {
        ItemType::Forum => {
            forums::Entity::update_many()
                .col_expr(forums::Column::IsHidden, Expr::value(hidden))
                .filter(forums::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
        ItemType::Thread => {
            threads::Entity::update_many()
                .col_expr(threads::Column::IsHidden, Expr::value(hidden))
                .filter(threads::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
        ItemType::Post | ItemType::Comment => {
            posts::Entity::update_many()
                .col_expr(posts::Column::IsHidden, Expr::value(hidden))
                .filter(posts::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
        ItemType::Announcement => {
            announcements::Entity::update_many()
                .col_expr(announcements::Column::IsHidden, Expr::value(hidden))
                .filter(announcements::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
        ItemType::Event => {
            events::Entity::update_many()
                .col_expr(events::Column::IsHidden, Expr::value(hidden))
                .filter(events::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
        ItemType::User => {
            users::Entity::update_many()
                .col_expr(users::Column::IsHidden, Expr::value(hidden))
                .filter(users::Column::Id.eq(item_id))
                .exec(db)
                .await?
                .rows_affected
        }
    };

    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::ItemType;

    #[test]
    fn test_allow_list() {
        for s in [
            "forum",
            "thread",
            "post",
            "comment",
            "announcement",
            "event",
            "user",
        ] {
            assert_eq!(ItemType::parse(s).map(|t| t.as_str()), Some(s));
        }
        assert_eq!(ItemType::parse("message"), None);
        assert_eq!(ItemType::parse("Post"), None);
    }

    #[test]
    fn test_comments_are_posts() {
        assert_eq!(ItemType::Comment.canonical(), ItemType::Post);
        assert_eq!(ItemType::Event.canonical(), ItemType::Event);
        assert_eq!(ItemType::Comment.stored_names(), ItemType::Post.stored_names());
    }
}
