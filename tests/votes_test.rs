//! Integration tests for post voting

mod common;

use agora::error::ApiError;
use agora::notifications;
use agora::orm::post_votes;
use agora::votes::{cast_vote, VoteType};
use common::{database::*, fixtures::*};
use sea_orm::{entity::*, query::*, PaginatorTrait};

#[actix_rt::test]
async fn test_vote_toggle_and_switch() {
    let db = setup_test_database().await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let voter = create_test_user(&db, "voter", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let caps = caps_for(&db, &voter).await;
    let post_id = board.post.id;

    let r = cast_vote(&db, &caps, post_id, "up").await.unwrap();
    assert_eq!((r.upvotes, r.downvotes), (1, 0));
    assert_eq!(r.user_vote, Some(VoteType::Up));

    // Same vote again retracts it.
    let r = cast_vote(&db, &caps, post_id, "upvote").await.unwrap();
    assert_eq!((r.upvotes, r.downvotes), (0, 0));
    assert_eq!(r.user_vote, None);
    assert_eq!(post_votes::Entity::find().count(&db).await.unwrap(), 0);

    cast_vote(&db, &caps, post_id, "up").await.unwrap();
    let r = cast_vote(&db, &caps, post_id, "down").await.unwrap();
    assert_eq!((r.upvotes, r.downvotes), (0, 1));
    assert_eq!(r.user_vote, Some(VoteType::Down));

    let rows = post_votes::Entity::find()
        .filter(post_votes::Column::UserId.eq(voter.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vote_type, "down");
}

#[actix_rt::test]
async fn test_counters_track_many_voters() {
    let db = setup_test_database().await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();

    let mut last = None;
    for (i, vote) in ["up", "up", "down", "up"].iter().enumerate() {
        let user = create_test_user(&db, &format!("voter{}", i), "password123")
            .await
            .unwrap();
        last = Some(
            cast_vote(&db, &caps_for(&db, &user).await, board.post.id, vote)
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    assert_eq!((last.upvotes, last.downvotes), (3, 1));
}

#[actix_rt::test]
async fn test_upvote_notifies_author_once() {
    let db = setup_test_database().await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let voter = create_test_user(&db, "voter", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let caps = caps_for(&db, &voter).await;

    cast_vote(&db, &caps, board.post.id, "up").await.unwrap();
    cast_vote(&db, &caps, board.post.id, "down").await.unwrap();
    cast_vote(&db, &caps, board.post.id, "down").await.unwrap();
    assert_eq!(notifications::count_unread(&db, author.id).await.unwrap(), 1);

    // Own posts never notify.
    let own = caps_for(&db, &author).await;
    cast_vote(&db, &own, board.post.id, "up").await.unwrap();
    assert_eq!(notifications::count_unread(&db, author.id).await.unwrap(), 1);
}

#[actix_rt::test]
async fn test_vote_rejections() {
    let db = setup_test_database().await.unwrap();
    let author = create_test_user(&db, "author", "password123").await.unwrap();
    let board = create_board(&db, author.id).await.unwrap();
    let caps = caps_for(&db, &author).await;

    let err = cast_vote(&db, &caps, board.post.id, "sideways").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = cast_vote(&db, &caps, board.post.id + 100, "up").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
