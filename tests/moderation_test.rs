//! Integration tests for report resolution

mod common;

use agora::auth::{AmbassadorRole, Capabilities};
use agora::error::ApiError;
use agora::moderation::{self, ResolveReport, SubmitReport};
use agora::notifications;
use agora::orm::{announcements, forums, post_votes, posts, threads};
use chrono::Utc;
use common::{database::*, fixtures::*};
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, PaginatorTrait,
    Statement,
};

struct Scene {
    admin: TestUser,
    author: TestUser,
    reporter: TestUser,
    moderator: TestUser,
    board: Board,
}

async fn scene(db: &DatabaseConnection) -> Scene {
    let admin = create_super_admin(db, "root").await.unwrap();
    let author = create_test_user(db, "author", "password123").await.unwrap();
    let reporter = create_test_user(db, "reporter", "password123").await.unwrap();
    let moderator = create_test_user(db, "moderator", "password123").await.unwrap();
    let board = create_board(db, author.id).await.unwrap();
    make_ambassador(db, moderator.id, board.community.id, AmbassadorRole::Moderator)
        .await
        .unwrap();
    Scene {
        admin,
        author,
        reporter,
        moderator,
        board,
    }
}

async fn report(
    db: &DatabaseConnection,
    reporter: &TestUser,
    item_type: &str,
    item_id: i32,
    reason: &str,
) -> i32 {
    let caps = caps_for(db, reporter).await;
    moderation::submit_report(
        db,
        &caps,
        SubmitReport {
            item_type: item_type.to_string(),
            item_id: Some(item_id),
            reason_code: reason.to_string(),
            reason_text: None,
            details: None,
        },
        &agora::app_config::ModerationConfig::default(),
    )
    .await
    .expect("Report should be accepted")
    .report
    .id
}

fn action(name: &str, notes: Option<&str>) -> ResolveReport {
    ResolveReport {
        action: name.to_string(),
        notes: notes.map(str::to_string),
    }
}

async fn notes_of_type(db: &DatabaseConnection, user_id: i32, kind: &str) -> usize {
    notifications::list_notifications(db, user_id, 100)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.type_ == kind)
        .count()
}

async fn post_hidden(db: &DatabaseConnection, post_id: i32) -> bool {
    posts::Entity::find_by_id(post_id)
        .one(db)
        .await
        .unwrap()
        .expect("Post should exist")
        .is_hidden
}

#[actix_rt::test]
async fn test_remove_post_deletes_reply_subtree() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let root = s.board.post.id;
    let thread_id = s.board.thread.id;

    // root <- a <- b, root <- c : three descendants.
    let a = create_post(&db, thread_id, s.reporter.id, Some(root)).await.unwrap();
    let b = create_post(&db, thread_id, s.author.id, Some(a.id)).await.unwrap();
    let c = create_post(&db, thread_id, s.moderator.id, Some(root)).await.unwrap();
    let sibling = create_post(&db, thread_id, s.author.id, None).await.unwrap();
    let sibling_reply = create_post(&db, thread_id, s.reporter.id, Some(sibling.id))
        .await
        .unwrap();
    agora::votes::cast_vote(&db, &caps_for(&db, &s.moderator).await, b.id, "up")
        .await
        .unwrap();
    agora::votes::cast_vote(&db, &caps_for(&db, &s.moderator).await, sibling.id, "down")
        .await
        .unwrap();

    let report_id = report(&db, &s.reporter, "post", root, "spam").await;
    let caps = caps_for(&db, &s.moderator).await;
    let resolved = moderation::resolve_report(&db, &caps, report_id, action("remove", Some("gone")))
        .await
        .expect("Removal should succeed");

    let removed = resolved.removed.expect("Removal outcome expected");
    assert_eq!(removed.posts, 4, "N descendants plus the post itself");
    assert!(!removed.hidden);
    assert!(resolved.changed);
    assert_eq!(resolved.report.status, "removed");
    assert_eq!(resolved.report.resolved_by, Some(s.moderator.id));
    assert!(resolved.report.resolved_at.is_some());
    assert_eq!(resolved.report.resolution_notes.as_deref(), Some("gone"));

    for id in [root, a.id, b.id, c.id] {
        assert!(posts::Entity::find_by_id(id).one(&db).await.unwrap().is_none());
    }
    for id in [sibling.id, sibling_reply.id] {
        assert!(posts::Entity::find_by_id(id).one(&db).await.unwrap().is_some());
    }
    let votes_left = post_votes::Entity::find().all(&db).await.unwrap();
    assert_eq!(votes_left.len(), 1);
    assert_eq!(votes_left[0].post_id, sibling.id);

    assert_eq!(notes_of_type(&db, s.reporter.id, "report_resolved").await, 1);
    assert_eq!(notes_of_type(&db, s.author.id, "moderation_notice").await, 1);
}

#[actix_rt::test]
async fn test_failed_removal_rolls_back() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let root = s.board.post.id;
    let reply = create_post(&db, s.board.thread.id, s.reporter.id, Some(root))
        .await
        .unwrap();
    let report_id = report(&db, &s.reporter, "post", root, "spam").await;

    // Outcome notifications are the last write of the removal.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "ALTER TABLE notifications RENAME TO notifications_moved".to_owned(),
    ))
    .await
    .unwrap();

    let caps = caps_for(&db, &s.moderator).await;
    let err = moderation::resolve_report(&db, &caps, report_id, action("remove", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Database(_)));

    for id in [root, reply.id] {
        assert!(posts::Entity::find_by_id(id).one(&db).await.unwrap().is_some());
    }
    let report = moderation::get_report(&db, &caps, report_id).await.unwrap();
    assert_eq!(report.status, "pending");
    assert!(report.resolved_at.is_none());
}

#[actix_rt::test]
async fn test_remove_thread_and_forum_cascade() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let thread_id = s.board.thread.id;
    create_post(&db, thread_id, s.reporter.id, Some(s.board.post.id))
        .await
        .unwrap();
    let other_thread = create_thread(&db, s.board.forum.id, s.author.id, "Second")
        .await
        .unwrap();
    create_post(&db, other_thread.id, s.author.id, None).await.unwrap();

    let admin = caps_for(&db, &s.admin).await;

    let report_id = report(&db, &s.reporter, "thread", thread_id, "spam").await;
    let resolved = moderation::resolve_report(&db, &admin, report_id, action("remove", None))
        .await
        .unwrap();
    let removed = resolved.removed.unwrap();
    assert_eq!((removed.threads, removed.posts), (1, 2));
    assert!(threads::Entity::find_by_id(thread_id).one(&db).await.unwrap().is_none());
    assert_eq!(posts::Entity::find().count(&db).await.unwrap(), 1);

    let report_id = report(&db, &s.reporter, "forum", s.board.forum.id, "spam").await;
    let resolved = moderation::resolve_report(&db, &admin, report_id, action("remove", None))
        .await
        .unwrap();
    let removed = resolved.removed.unwrap();
    assert_eq!((removed.forums, removed.threads, removed.posts), (1, 1, 1));
    assert!(forums::Entity::find_by_id(s.board.forum.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
    assert_eq!(threads::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(posts::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_remove_announcement_hides_it() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let announcement = announcements::ActiveModel {
        community_id: Set(s.board.community.id),
        user_id: Set(s.author.id),
        title: Set("Exams".to_string()),
        body: Set("Moved to Friday".to_string()),
        is_hidden: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let report_id = report(&db, &s.reporter, "announcement", announcement.id, "misinformation").await;
    let resolved = moderation::resolve_report(
        &db,
        &caps_for(&db, &s.moderator).await,
        report_id,
        action("remove", None),
    )
    .await
    .unwrap();

    assert!(resolved.removed.unwrap().hidden);
    let row = announcements::Entity::find_by_id(announcement.id)
        .one(&db)
        .await
        .unwrap()
        .expect("Announcements are hidden, not deleted");
    assert!(row.is_hidden);
}

#[actix_rt::test]
async fn test_dismiss_twice_only_updates_notes() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let report_id = report(&db, &s.reporter, "post", s.board.post.id, "harassment").await;
    assert!(post_hidden(&db, s.board.post.id).await);

    let caps = caps_for(&db, &s.moderator).await;
    let first = moderation::resolve_report(&db, &caps, report_id, action("dismiss", Some("fine")))
        .await
        .unwrap();
    assert!(first.changed);
    assert_eq!(first.report.status, "dismissed");
    assert!(!post_hidden(&db, s.board.post.id).await);
    assert_eq!(notes_of_type(&db, s.reporter.id, "report_resolved").await, 1);
    assert_eq!(notes_of_type(&db, s.author.id, "moderation_notice").await, 0);

    let second = moderation::resolve_report(&db, &caps, report_id, action("dismiss", Some("still fine")))
        .await
        .expect("Repeating the same resolution is allowed");
    assert!(!second.changed);
    assert_eq!(second.report.status, "dismissed");
    assert_eq!(second.report.resolution_notes.as_deref(), Some("still fine"));
    assert_eq!(second.report.resolved_at, first.report.resolved_at);
    assert_eq!(notes_of_type(&db, s.reporter.id, "report_resolved").await, 1);
}

#[actix_rt::test]
async fn test_retain_unhides_and_notifies_both_parties() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let report_id = report(&db, &s.reporter, "post", s.board.post.id, "harassment").await;
    assert!(post_hidden(&db, s.board.post.id).await);

    let resolved = moderation::resolve_report(
        &db,
        &caps_for(&db, &s.admin).await,
        report_id,
        action("retain", None),
    )
    .await
    .unwrap();

    assert_eq!(resolved.report.status, "retained");
    assert!(!post_hidden(&db, s.board.post.id).await);
    assert_eq!(notifications::count_unread(&db, s.reporter.id).await.unwrap(), 1);
    assert_eq!(notifications::count_unread(&db, s.author.id).await.unwrap(), 1);
    assert_eq!(notes_of_type(&db, s.reporter.id, "report_resolved").await, 1);
    assert_eq!(notes_of_type(&db, s.author.id, "moderation_notice").await, 1);
}

#[actix_rt::test]
async fn test_hide_review_restore_cycle() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let report_id = report(&db, &s.reporter, "post", s.board.post.id, "spam").await;
    let caps = caps_for(&db, &s.moderator).await;

    let hidden = moderation::resolve_report(&db, &caps, report_id, action("hide", None))
        .await
        .unwrap();
    assert_eq!(hidden.report.status, "under_review");
    assert!(hidden.report.resolved_at.is_none());
    assert!(post_hidden(&db, s.board.post.id).await);

    let dismissed = moderation::resolve_report(&db, &caps, report_id, action("dismiss", None))
        .await
        .unwrap();
    assert_eq!(dismissed.report.status, "dismissed");

    // Terminal reports only move back through restore.
    for next in ["retain", "remove", "review", "hide"] {
        let err = moderation::resolve_report(&db, &caps, report_id, action(next, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)), "{} should conflict", next);
    }

    let restored = moderation::resolve_report(&db, &caps, report_id, action("restore", None))
        .await
        .unwrap();
    assert_eq!(restored.report.status, "pending");
    assert!(restored.report.resolved_at.is_none());
    assert!(!post_hidden(&db, s.board.post.id).await);

    let reviewed = moderation::resolve_report(&db, &caps, report_id, action("review", None))
        .await
        .unwrap();
    assert_eq!(reviewed.report.status, "under_review");
}

#[actix_rt::test]
async fn test_resolution_failure_modes() {
    let db = setup_test_database().await.unwrap();
    let s = scene(&db).await;
    let report_id = report(&db, &s.reporter, "post", s.board.post.id, "spam").await;
    let moderator = caps_for(&db, &s.moderator).await;

    let err = moderation::resolve_report(&db, &moderator, report_id, action("delete", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = moderation::resolve_report(&db, &moderator, report_id + 50, action("dismiss", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let member = caps_for(&db, &s.reporter).await;
    let err = moderation::resolve_report(&db, &member, report_id, action("dismiss", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let outsider = Capabilities::new(s.reporter.id, "reporter", 2)
        .with_ambassadorship(s.board.community.id + 1, AmbassadorRole::Admin);
    let err = moderation::resolve_report(&db, &outsider, report_id, action("dismiss", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // Nothing changed.
    let report = moderation::get_report(&db, &moderator, report_id).await.unwrap();
    assert_eq!(report.status, "pending");
}
