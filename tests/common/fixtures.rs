//! Test fixtures for creating test data
#![allow(dead_code)]
#![allow(clippy::needless_update)]

use agora::auth::{AmbassadorRole, Capabilities};
use agora::orm::{ambassadors, communities, forums, posts, threads, users};
use chrono::Utc;
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Test user fixture
pub struct TestUser {
    pub id: i32,
    pub username: String,
    pub password: String, // Plain text password for testing
}

/// Create a test user with known credentials
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<TestUser, DbErr> {
    create_user_with_role(db, username, password, users::ROLE_MEMBER).await
}

pub async fn create_super_admin(db: &DatabaseConnection, username: &str) -> Result<TestUser, DbErr> {
    create_user_with_role(db, username, "password123", users::ROLE_SUPER_ADMIN).await
}

async fn create_user_with_role(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role_id: i32,
) -> Result<TestUser, DbErr> {
    let user = users::ActiveModel {
        username: Set(username.to_string()),
        password: Set(agora::auth::hash_password(password)?),
        role_id: Set(role_id),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        last_active_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(TestUser {
        id: user.id,
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Capability context as the middleware would build it.
pub async fn caps_for(db: &DatabaseConnection, user: &TestUser) -> Capabilities {
    Capabilities::load(db, user.id)
        .await
        .expect("Failed to load capabilities")
        .expect("User should exist")
}

pub async fn create_community(db: &DatabaseConnection, name: &str) -> Result<communities::Model, DbErr> {
    communities::ActiveModel {
        name: Set(name.to_string()),
        kind: Set("university".to_string()),
        description: Set(None),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn make_ambassador(
    db: &DatabaseConnection,
    user_id: i32,
    community_id: i32,
    role: AmbassadorRole,
) -> Result<ambassadors::Model, DbErr> {
    ambassadors::ActiveModel {
        user_id: Set(user_id),
        community_id: Set(community_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_forum(
    db: &DatabaseConnection,
    community_id: i32,
    title: &str,
) -> Result<forums::Model, DbErr> {
    forums::ActiveModel {
        community_id: Set(community_id),
        title: Set(title.to_string()),
        description: Set(None),
        created_by: Set(None),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_thread(
    db: &DatabaseConnection,
    forum_id: i32,
    user_id: i32,
    title: &str,
) -> Result<threads::Model, DbErr> {
    threads::ActiveModel {
        forum_id: Set(forum_id),
        user_id: Set(user_id),
        title: Set(title.to_string()),
        body: Set(format!("Body of {}", title)),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_post(
    db: &DatabaseConnection,
    thread_id: i32,
    user_id: i32,
    reply_to: Option<i32>,
) -> Result<posts::Model, DbErr> {
    posts::ActiveModel {
        thread_id: Set(thread_id),
        user_id: Set(user_id),
        reply_to: Set(reply_to),
        content: Set("Test post content".to_string()),
        upvotes: Set(0),
        downvotes: Set(0),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// A community with one forum, one thread and one top-level post.
pub struct Board {
    pub community: communities::Model,
    pub forum: forums::Model,
    pub thread: threads::Model,
    pub post: posts::Model,
}

pub async fn create_board(db: &DatabaseConnection, author_id: i32) -> Result<Board, DbErr> {
    let community = create_community(db, "Test University").await?;
    let forum = create_forum(db, community.id, "General").await?;
    let thread = create_thread(db, forum.id, author_id, "Hello").await?;
    let post = create_post(db, thread.id, author_id, None).await?;
    Ok(Board {
        community,
        forum,
        thread,
        post,
    })
}
