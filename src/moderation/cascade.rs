//! Hard deletion of posts, threads and forums.
//!
//! Reply chains are walked with an explicit stack over an arena of post ids
//! so adversarially deep chains cannot exhaust the call stack. Rows are
//! deleted leaves first so self-referencing `reply_to` keys never dangle.

use crate::orm::{forums, post_votes, posts, threads};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use std::collections::{HashMap, HashSet};

/// Counts of rows removed by a cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Removed {
    pub forums: u64,
    pub threads: u64,
    pub posts: u64,
}

/// Collects `root` and every descendant reachable through `(id, reply_to)`
/// edges, in pre-order. Cycles are cut by the visited set.
pub fn collect_subtree(root: i32, edges: &[(i32, Option<i32>)]) -> Vec<i32> {
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for &(id, parent) in edges {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        if let Some(kids) = children.get(&id) {
            // Reverse so siblings come out in their original order.
            stack.extend(kids.iter().rev().copied());
        }
    }

    out
}

async fn delete_votes_for<C>(db: &C, post_ids: &[i32]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if post_ids.is_empty() {
        return Ok(());
    }
    post_votes::Entity::delete_many()
        .filter(post_votes::Column::PostId.is_in(post_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes a post and all of its replies. Returns the number of posts removed.
pub async fn delete_post_subtree<C>(db: &C, post_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let root = match posts::Entity::find_by_id(post_id).one(db).await? {
        Some(post) => post,
        None => return Ok(0),
    };

    // Replies live in the same thread as their parent.
    let edges: Vec<(i32, Option<i32>)> = posts::Entity::find()
        .filter(posts::Column::ThreadId.eq(root.thread_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.reply_to))
        .collect();

    let subtree = collect_subtree(root.id, &edges);
    delete_votes_for(db, &subtree).await?;

    let mut removed = 0;
    for id in subtree.iter().rev() {
        removed += posts::Entity::delete_by_id(*id).exec(db).await?.rows_affected;
    }

    log::info!(
        "Deleted post {} with {} repl(ies)",
        post_id,
        removed.saturating_sub(1)
    );
    Ok(removed)
}

async fn delete_thread_posts<C>(db: &C, thread_id: i32) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let edges: Vec<(i32, Option<i32>)> = posts::Entity::find()
        .filter(posts::Column::ThreadId.eq(thread_id))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.reply_to))
        .collect();

    // Walk from every top-level post so children are deleted before parents.
    let ids: HashSet<i32> = edges.iter().map(|&(id, _)| id).collect();
    let mut order = Vec::with_capacity(edges.len());
    let mut seen = HashSet::new();
    for &(id, parent) in &edges {
        let is_root = parent.map_or(true, |p| !ids.contains(&p));
        if is_root {
            for pid in collect_subtree(id, &edges) {
                if seen.insert(pid) {
                    order.push(pid);
                }
            }
        }
    }
    // Anything left is part of a reply cycle with no root.
    for &(id, _) in &edges {
        if seen.insert(id) {
            order.push(id);
        }
    }

    delete_votes_for(db, &order).await?;

    let mut removed = 0;
    for id in order.iter().rev() {
        removed += posts::Entity::delete_by_id(*id).exec(db).await?.rows_affected;
    }
    Ok(removed)
}

/// Deletes a thread's posts, then the thread.
pub async fn delete_thread<C>(db: &C, thread_id: i32) -> Result<Removed, DbErr>
where
    C: ConnectionTrait,
{
    let posts_removed = delete_thread_posts(db, thread_id).await?;
    let threads_removed = threads::Entity::delete_by_id(thread_id)
        .exec(db)
        .await?
        .rows_affected;

    log::info!(
        "Deleted thread {} and {} post(s)",
        thread_id,
        posts_removed
    );
    Ok(Removed {
        forums: 0,
        threads: threads_removed,
        posts: posts_removed,
    })
}

/// Deletes every thread of a forum (with their posts), then the forum.
pub async fn delete_forum<C>(db: &C, forum_id: i32) -> Result<Removed, DbErr>
where
    C: ConnectionTrait,
{
    let thread_ids: Vec<i32> = threads::Entity::find()
        .filter(threads::Column::ForumId.eq(forum_id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let mut removed = Removed::default();
    for thread_id in thread_ids {
        let r = delete_thread(db, thread_id).await?;
        removed.threads += r.threads;
        removed.posts += r.posts;
    }

    removed.forums = forums::Entity::delete_by_id(forum_id)
        .exec(db)
        .await?
        .rows_affected;

    log::info!(
        "Deleted forum {} with {} thread(s) and {} post(s)",
        forum_id,
        removed.threads,
        removed.posts
    );
    Ok(removed)
}
