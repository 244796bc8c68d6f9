//! Integration tests for report intake

mod common;

use agora::auth::AmbassadorRole;
use agora::error::ApiError;
use agora::moderation::{self, SubmitReport};
use agora::notifications;
use agora::orm::{posts, reports};
use common::{database::*, fixtures::*};
use sea_orm::{entity::*, query::*, DatabaseConnection, PaginatorTrait};

fn post_report(post_id: i32, reason: &str) -> SubmitReport {
    SubmitReport {
        item_type: "post".to_string(),
        item_id: Some(post_id),
        reason_code: reason.to_string(),
        reason_text: None,
        details: None,
    }
}

async fn is_post_hidden(db: &DatabaseConnection, post_id: i32) -> bool {
    posts::Entity::find_by_id(post_id)
        .one(db)
        .await
        .expect("Failed to fetch post")
        .expect("Post should exist")
        .is_hidden
}

async fn unread(db: &DatabaseConnection, user_id: i32) -> u64 {
    notifications::count_unread(db, user_id)
        .await
        .expect("Failed to count notifications")
}

#[actix_rt::test]
async fn test_high_severity_report_hides_and_escalates() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let admin = create_super_admin(&db, "root").await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let moderator = create_test_user(&db, "moderator", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    make_ambassador(&db, moderator.id, board.community.id, AmbassadorRole::Moderator)
        .await
        .unwrap();

    let caps = caps_for(&db, &reporter).await;
    let submitted = moderation::submit_report(&db, &caps, post_report(board.post.id, "harassment"), &policy)
        .await
        .expect("Report should be accepted");

    assert_eq!(submitted.report.status, "pending");
    assert_eq!(submitted.report.severity, "high");
    assert_eq!(submitted.report.details, None);
    assert_eq!(submitted.report.resolution_notes, None);
    assert_eq!(submitted.report.community_id, Some(board.community.id));
    assert_eq!(submitted.report.forum_id, Some(board.forum.id));
    assert_eq!(submitted.report.thread_id, Some(board.thread.id));
    assert_eq!(submitted.report.reported_user_id, Some(author.id));
    assert!(submitted.auto_hidden);
    assert_eq!(submitted.notified, 2);
    assert!(is_post_hidden(&db, board.post.id).await);

    assert_eq!(unread(&db, admin.id).await, 1);
    assert_eq!(unread(&db, moderator.id).await, 1);
    assert_eq!(unread(&db, reporter.id).await, 0);
    assert_eq!(unread(&db, author.id).await, 0);

    let note = notifications::list_notifications(&db, admin.id, 10)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(note.type_, "report");
    assert_eq!(note.reference_id, Some(submitted.report.id));

    let count = reports::Entity::find().count(&db).await.unwrap();
    assert_eq!(count, 1, "Exactly one report row should exist");
}

#[actix_rt::test]
async fn test_low_severity_hides_after_three_reporters() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let admin = create_super_admin(&db, "root").await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let moderator = create_test_user(&db, "moderator", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    make_ambassador(&db, moderator.id, board.community.id, AmbassadorRole::Moderator)
        .await
        .unwrap();

    for (i, name) in ["r1", "r2", "r3"].iter().enumerate() {
        let reporter = create_test_user(&db, name, "password123").await.unwrap();
        let caps = caps_for(&db, &reporter).await;
        let submitted = moderation::submit_report(&db, &caps, post_report(board.post.id, "spam"), &policy)
            .await
            .expect("Report should be accepted");

        assert_eq!(submitted.report.severity, "low");
        let expect_hidden = i == 2;
        assert_eq!(submitted.auto_hidden, expect_hidden);
        assert_eq!(is_post_hidden(&db, board.post.id).await, expect_hidden);
    }

    // Low severity on a post does not escalate.
    assert_eq!(unread(&db, admin.id).await, 0);
    assert_eq!(unread(&db, moderator.id).await, 3);
}

#[actix_rt::test]
async fn test_duplicate_open_report_conflicts() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let caps = caps_for(&db, &reporter).await;

    moderation::submit_report(&db, &caps, post_report(board.post.id, "spam"), &policy)
        .await
        .unwrap();
    let err = moderation::submit_report(&db, &caps, post_report(board.post.id, "spam"), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // A repeat report never counts as a second distinct reporter.
    assert!(!is_post_hidden(&db, board.post.id).await);
}

#[actix_rt::test]
async fn test_invalid_submissions() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let caps = caps_for(&db, &reporter).await;

    let mut input = post_report(1, "spam");
    input.item_type = "message".to_string();
    let err = moderation::submit_report(&db, &caps, input, &policy).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut input = post_report(1, "spam");
    input.item_id = None;
    let err = moderation::submit_report(&db, &caps, input, &policy).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = moderation::submit_report(&db, &caps, post_report(1, "  "), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut input = post_report(1, "spam");
    input.details = Some("x".repeat(policy.max_report_details + 1));
    let err = moderation::submit_report(&db, &caps, input, &policy).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = moderation::submit_report(&db, &caps, post_report(9999, "spam"), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 0);
}

#[actix_rt::test]
async fn test_user_reports_reach_super_admins() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let admin = create_super_admin(&db, "root").await.unwrap();
    let target = create_test_user(&db, "target", "password123").await.unwrap();
    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let caps = caps_for(&db, &reporter).await;

    let submitted = moderation::submit_report(
        &db,
        &caps,
        SubmitReport {
            item_type: "user".to_string(),
            item_id: Some(target.id),
            reason_code: "other".to_string(),
            reason_text: Some("  suspicious profile ".to_string()),
            details: None,
        },
        &policy,
    )
    .await
    .unwrap();

    assert_eq!(submitted.report.community_id, None);
    assert_eq!(submitted.report.reported_user_id, Some(target.id));
    assert_eq!(submitted.report.reason_text.as_deref(), Some("suspicious profile"));
    assert!(!submitted.auto_hidden);
    assert_eq!(unread(&db, admin.id).await, 1);
}

#[actix_rt::test]
async fn test_reported_ambassador_escalates() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let admin = create_super_admin(&db, "root").await.unwrap();
    let moderator = create_test_user(&db, "moderator", "password123").await.unwrap();
    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let board = create_board(&db, moderator.id).await.unwrap();
    make_ambassador(&db, moderator.id, board.community.id, AmbassadorRole::Moderator)
        .await
        .unwrap();

    let caps = caps_for(&db, &reporter).await;
    moderation::submit_report(&db, &caps, post_report(board.post.id, "off_topic"), &policy)
        .await
        .unwrap();

    assert_eq!(unread(&db, admin.id).await, 1);
    // The reported moderator is still one of the community's ambassadors.
    assert_eq!(unread(&db, moderator.id).await, 1);
}

#[actix_rt::test]
async fn test_report_listing_permissions() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let admin = create_super_admin(&db, "root").await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let reporter = create_test_user(&db, "reporter", "password123").await.unwrap();
    let moderator = create_test_user(&db, "moderator", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let other = create_community(&db, "Elsewhere").await.unwrap();
    make_ambassador(&db, moderator.id, other.id, AmbassadorRole::Moderator)
        .await
        .unwrap();

    let caps = caps_for(&db, &reporter).await;
    let report = moderation::submit_report(&db, &caps, post_report(board.post.id, "spam"), &policy)
        .await
        .unwrap()
        .report;

    let err = moderation::list_reports(&db, &caps_for(&db, &author).await, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let seen = moderation::list_reports(&db, &caps_for(&db, &moderator).await, None)
        .await
        .unwrap();
    assert!(seen.is_empty(), "Moderator of another community sees nothing");

    let admin_caps = caps_for(&db, &admin).await;
    let seen = moderation::list_reports(&db, &admin_caps, None).await.unwrap();
    assert_eq!(seen.len(), 1);
    let seen = moderation::list_reports(&db, &admin_caps, Some("dismissed")).await.unwrap();
    assert!(seen.is_empty());
    let err = moderation::list_reports(&db, &admin_caps, Some("bogus")).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // The reporter may read their own report; an unrelated moderator may not.
    assert!(moderation::get_report(&db, &caps, report.id).await.is_ok());
    let err = moderation::get_report(&db, &caps_for(&db, &moderator).await, report.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    let err = moderation::get_report(&db, &admin_caps, report.id + 100)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[actix_rt::test]
async fn test_comment_and_post_reports_share_one_item() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let policy = agora::app_config::ModerationConfig::default();

    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let reply = create_post(&db, board.thread.id, author.id, Some(board.post.id))
        .await
        .unwrap();
    let as_comment = |reason: &str| SubmitReport {
        item_type: "comment".to_string(),
        ..post_report(reply.id, reason)
    };

    let first = create_test_user(&db, "r1", "password123").await.unwrap();
    let caps = caps_for(&db, &first).await;
    let submitted = moderation::submit_report(&db, &caps, as_comment("spam"), &policy)
        .await
        .unwrap();
    assert_eq!(submitted.report.item_type, "post");

    let err = moderation::submit_report(&db, &caps, post_report(reply.id, "spam"), &policy)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let second = create_test_user(&db, "r2", "password123").await.unwrap();
    let submitted = moderation::submit_report(
        &db,
        &caps_for(&db, &second).await,
        post_report(reply.id, "spam"),
        &policy,
    )
    .await
    .unwrap();
    assert!(!submitted.auto_hidden);

    let third = create_test_user(&db, "r3", "password123").await.unwrap();
    let submitted = moderation::submit_report(&db, &caps_for(&db, &third).await, as_comment("spam"), &policy)
        .await
        .unwrap();
    assert!(submitted.auto_hidden, "Three distinct reporters across both names");
    assert!(is_post_hidden(&db, reply.id).await);
}
