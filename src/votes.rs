//! Post voting. Counters on `posts` are kept in step with `post_votes` rows
//! inside one transaction.

use crate::auth::Capabilities;
use crate::error::{ApiError, ApiResult};
use crate::notifications::{self, NotificationType};
use crate::orm::{post_votes, posts};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, DbErr, Set,
    TransactionTrait,
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" | "upvote" => Some(Self::Up),
            "down" | "downvote" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    fn counter(&self) -> posts::Column {
        match self {
            Self::Up => posts::Column::Upvotes,
            Self::Down => posts::Column::Downvotes,
        }
    }
}

/// Counter changes implied by a vote, given the caller's previous vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteChange {
    Cast(VoteType),
    Retract(VoteType),
    Switch { from: VoteType, to: VoteType },
}

pub fn plan_vote(previous: Option<VoteType>, requested: VoteType) -> VoteChange {
    match previous {
        None => VoteChange::Cast(requested),
        Some(prev) if prev == requested => VoteChange::Retract(prev),
        Some(prev) => VoteChange::Switch {
            from: prev,
            to: requested,
        },
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct VoteResult {
    pub post_id: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    /// The caller's vote after this call.
    pub user_vote: Option<VoteType>,
}

async fn bump<C>(db: &C, post_id: i32, vote: VoteType, delta: i32) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let col = vote.counter();
    let expr = if delta >= 0 {
        Expr::col(col).add(delta)
    } else {
        Expr::col(col).sub(-delta)
    };
    posts::Entity::update_many()
        .col_expr(col, expr)
        .filter(posts::Column::Id.eq(post_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn cast_vote(
    db: &DatabaseConnection,
    caps: &Capabilities,
    post_id: i32,
    vote_type: &str,
) -> ApiResult<VoteResult> {
    let requested = VoteType::parse(vote_type.trim())
        .ok_or_else(|| ApiError::bad_request("Vote type must be 'up' or 'down'"))?;

    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .filter(|p| !p.is_hidden)
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let txn = db.begin().await?;

    let existing = post_votes::Entity::find()
        .filter(post_votes::Column::PostId.eq(post_id))
        .filter(post_votes::Column::UserId.eq(caps.user_id))
        .one(&txn)
        .await?;
    let previous = existing
        .as_ref()
        .and_then(|v| VoteType::parse(&v.vote_type));

    let change = plan_vote(previous, requested);
    match change {
        VoteChange::Cast(vote) => {
            // A row with an unreadable type is replaced rather than counted.
            if let Some(row) = existing {
                post_votes::Entity::delete_by_id(row.id).exec(&txn).await?;
            }
            post_votes::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(caps.user_id),
                vote_type: Set(vote.as_str().to_string()),
                created_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            bump(&txn, post_id, vote, 1).await?;
        }
        VoteChange::Retract(vote) => {
            post_votes::Entity::delete_many()
                .filter(post_votes::Column::PostId.eq(post_id))
                .filter(post_votes::Column::UserId.eq(caps.user_id))
                .exec(&txn)
                .await?;
            bump(&txn, post_id, vote, -1).await?;
        }
        VoteChange::Switch { from, to } => {
            post_votes::Entity::update_many()
                .col_expr(post_votes::Column::VoteType, Expr::value(to.as_str()))
                .filter(post_votes::Column::PostId.eq(post_id))
                .filter(post_votes::Column::UserId.eq(caps.user_id))
                .exec(&txn)
                .await?;
            bump(&txn, post_id, from, -1).await?;
            bump(&txn, post_id, to, 1).await?;
        }
    }

    if change == VoteChange::Cast(VoteType::Up) && post.user_id != caps.user_id {
        notifications::create_notification(
            &txn,
            post.user_id,
            Some(caps.user_id),
            NotificationType::Vote,
            Some(post_id),
            &format!("{} upvoted your post", caps.username),
        )
        .await?;
    }

    let updated = posts::Entity::find_by_id(post_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    txn.commit().await?;

    let user_vote = match change {
        VoteChange::Cast(v) => Some(v),
        VoteChange::Retract(_) => None,
        VoteChange::Switch { to, .. } => Some(to),
    };

    Ok(VoteResult {
        post_id,
        upvotes: updated.upvotes,
        downvotes: updated.downvotes,
        user_vote,
    })
}
