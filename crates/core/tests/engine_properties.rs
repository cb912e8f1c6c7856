//! Cross-ledger properties of the relationship engine, run against the
//! in-memory store.

#![allow(clippy::unwrap_used)]

use futures::future::join_all;
use tobaeki_common::AppError;
use tobaeki_core::{MemoryStore, Page, RelationshipEngine};

const POST: i64 = 5;
const OWNER: i64 = 9;

async fn engine() -> RelationshipEngine<MemoryStore> {
    let store = MemoryStore::new();
    store.insert_post(POST, OWNER).await;
    RelationshipEngine::new(store)
}

/// Number of pending requests plus friendships between two users.
async fn pair_state(engine: &RelationshipEngine<MemoryStore>, a: i64, b: i64) -> usize {
    let friendships = engine.friendships();
    let sent_by_a = friendships
        .sent_requests(a, Page::new(1, Page::MAX_LIMIT))
        .await
        .unwrap();
    let sent_by_b = friendships
        .sent_requests(b, Page::new(1, Page::MAX_LIMIT))
        .await
        .unwrap();
    let friends = friendships.list_friends(a).await.unwrap();

    sent_by_a.iter().filter(|r| r.addressee_id == b).count()
        + sent_by_b.iter().filter(|r| r.addressee_id == a).count()
        + friends.iter().filter(|f| f.friend_id == b).count()
}

#[tokio::test]
async fn send_accept_then_resend_conflicts() {
    let engine = engine().await;
    let friendships = engine.friendships();

    let request = friendships.send_request(1, 2).await.unwrap();
    let friendship = friendships.accept_request(request.id).await.unwrap();

    assert_eq!((friendship.member_a, friendship.member_b), (1, 2));
    assert!(matches!(
        friendships.send_request(1, 2).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(pair_state(&engine, 1, 2).await, 1);
}

#[tokio::test]
async fn block_in_either_direction_removes_friendship() {
    for (blocker, blocked) in [(1, 2), (2, 1)] {
        let engine = engine().await;
        let friendships = engine.friendships();
        let request = friendships.send_request(1, 2).await.unwrap();
        friendships.accept_request(request.id).await.unwrap();

        friendships.block_user(blocker, blocked).await.unwrap();

        assert!(friendships.list_friends(1).await.unwrap().is_empty());
        assert!(friendships.list_friends(2).await.unwrap().is_empty());
        assert!(
            engine
                .blocking()
                .is_blocked_either_direction(1, 2)
                .await
                .unwrap()
        );
    }
}

#[tokio::test]
async fn blocked_user_cannot_send_request() {
    let engine = engine().await;
    let friendships = engine.friendships();
    friendships.block_user(1, 2).await.unwrap();

    let result = friendships.send_request(2, 1).await;

    assert!(matches!(result, Err(AppError::BlockedRelationship(_))));
    assert_eq!(pair_state(&engine, 1, 2).await, 0);
}

#[tokio::test]
async fn unblock_allows_requests_again() {
    let engine = engine().await;
    let friendships = engine.friendships();
    friendships.block_user(1, 2).await.unwrap();

    friendships.unblock_user(1, 2).await.unwrap();

    assert!(friendships.send_request(2, 1).await.is_ok());
}

#[tokio::test]
async fn owner_block_is_the_only_one_that_matters_for_participation() {
    let engine = engine().await;
    engine.friendships().block_user(3, OWNER).await.unwrap();
    engine.friendships().block_user(OWNER, 4).await.unwrap();

    let participation = engine.participation();
    assert!(participation.create_request(POST, 3).await.is_ok());
    assert!(matches!(
        participation.create_request(POST, 4).await,
        Err(AppError::BlockedRelationship(_))
    ));
    assert!(matches!(
        participation.create_request(POST, OWNER).await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_yield_one_success() {
    const SENDERS: usize = 16;
    let engine = engine().await;

    let handles = (0..SENDERS).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.friendships().send_request(1, 2).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, SENDERS - 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_in_both_directions_yield_one_success() {
    let engine = engine().await;

    let handles = (0..12).map(|i| {
        let engine = engine.clone();
        let (from, to) = if i % 2 == 0 { (1, 2) } else { (2, 1) };
        tokio::spawn(async move { engine.friendships().send_request(from, to).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(pair_state(&engine, 1, 2).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_yield_one_friendship() {
    let engine = engine().await;
    let request_id = engine.friendships().send_request(1, 2).await.unwrap().id;

    let handles = (0..8).map(|_| {
        let engine = engine.clone();
        tokio::spawn(async move { engine.friendships().accept_request(request_id).await })
    });
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppError::NotFound(_))))
            .count(),
        7
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_block_and_accept_never_leave_a_friendship_behind_a_block() {
    for _ in 0..20 {
        let engine = engine().await;
        let request_id = engine.friendships().send_request(1, 2).await.unwrap().id;

        let accept = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.friendships().accept_request(request_id).await })
        };
        let block = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.friendships().block_user(2, 1).await })
        };
        let _ = accept.await.unwrap();
        block.await.unwrap().unwrap();

        assert!(engine.friendships().list_friends(1).await.unwrap().is_empty());
    }
}
