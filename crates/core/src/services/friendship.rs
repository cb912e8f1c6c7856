//! Friendship service.
//!
//! Drives the per-pair workflow `NONE -> REQUESTED -> FRIENDS`. Every check
//! and write of one call runs in a single ledger transaction, and the pair is
//! locked before any block or friendship state is read, so a concurrent block
//! cannot slip between the block re-check and the friendship insert.

use std::sync::Arc;

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tobaeki_common::{AppError, AppResult};
use tobaeki_db::entities::{friend_request, friendship, user_block};
use tracing::{debug, info};

use super::blocking::BlockingService;
use super::guards::{ensure_distinct, ensure_valid_id, require};
use crate::ledger::{
    BlockLedger, FriendRequestLedger, FriendshipLedger, LedgerStore, LedgerTxn, Page,
};

/// A friendship seen from one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    /// ID of the friendship row
    pub friendship_id: i64,
    /// The member that is not the queried user
    pub friend_id: i64,
    /// When the friendship was confirmed
    pub created_at: DateTimeWithTimeZone,
}

impl Friend {
    fn from_model(model: &friendship::Model, user_id: i64) -> Self {
        Self {
            friendship_id: model.id,
            friend_id: model.other_member(user_id),
            created_at: model.created_at,
        }
    }
}

/// Friendship service for business logic.
pub struct FriendshipService<S> {
    store: Arc<S>,
    blocking: BlockingService<S>,
}

impl<S> Clone for FriendshipService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            blocking: self.blocking.clone(),
        }
    }
}

impl<S: LedgerStore> FriendshipService<S> {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(store: Arc<S>, blocking: BlockingService<S>) -> Self {
        Self { store, blocking }
    }

    /// Send a friend request.
    pub async fn send_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        ensure_valid_id(requester_id, "requesterId")?;
        ensure_valid_id(addressee_id, "addresseeId")?;
        ensure_distinct(
            requester_id,
            addressee_id,
            "Cannot send a friend request to yourself",
        )?;

        let mut txn = self.store.begin().await?;
        txn.lock_pair(requester_id, addressee_id).await?;

        if txn.is_blocked_between(requester_id, addressee_id).await? {
            debug!(requester_id, addressee_id, "Friend request rejected: blocked");
            return Err(AppError::BlockedRelationship(
                "Cannot send a friend request while either user blocks the other".to_string(),
            ));
        }

        if txn
            .find_friend_request_between(requester_id, addressee_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A friend request between these users already exists".to_string(),
            ));
        }

        if txn
            .find_friendship_between(requester_id, addressee_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Users are already friends".to_string()));
        }

        let request = txn
            .insert_friend_request(requester_id, addressee_id)
            .await?;
        txn.commit().await?;

        info!(
            request_id = request.id,
            requester_id, addressee_id, "Friend request sent"
        );
        Ok(request)
    }

    /// Accept a pending friend request, replacing it with a friendship.
    pub async fn accept_request(&self, request_id: i64) -> AppResult<friendship::Model> {
        ensure_valid_id(request_id, "requestId")?;

        let mut txn = self.store.begin().await?;
        let request = require(
            txn.find_friend_request(request_id).await?,
            "Friend request",
        )?;
        txn.lock_pair(request.requester_id, request.addressee_id)
            .await?;

        // A block may have appeared after the request was sent.
        if txn
            .is_blocked_between(request.requester_id, request.addressee_id)
            .await?
        {
            debug!(request_id, "Friend request acceptance rejected: blocked");
            return Err(AppError::BlockedRelationship(
                "Cannot accept a friend request while either user blocks the other".to_string(),
            ));
        }

        txn.delete_friend_request(request.id).await?;
        let friendship = txn
            .insert_friendship(request.requester_id, request.addressee_id)
            .await?;
        txn.commit().await?;

        info!(
            request_id,
            friendship_id = friendship.id,
            "Friend request accepted"
        );
        Ok(friendship)
    }

    /// Decline a friend request. Also used by the requester to cancel it.
    pub async fn decline_request(&self, request_id: i64) -> AppResult<()> {
        ensure_valid_id(request_id, "requestId")?;

        let mut txn = self.store.begin().await?;
        let request = require(
            txn.find_friend_request(request_id).await?,
            "Friend request",
        )?;
        txn.delete_friend_request(request.id).await?;
        txn.commit().await?;

        info!(request_id, "Friend request declined");
        Ok(())
    }

    /// Delete a friendship.
    pub async fn delete_friendship(&self, friendship_id: i64) -> AppResult<()> {
        ensure_valid_id(friendship_id, "friendshipId")?;

        let mut txn = self.store.begin().await?;
        let friendship = require(txn.find_friendship(friendship_id).await?, "Friendship")?;
        txn.delete_friendship(friendship.id).await?;
        txn.commit().await?;

        info!(friendship_id, "Friendship deleted");
        Ok(())
    }

    /// Block a user, ending any friendship with them.
    pub async fn block_user(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<user_block::Model> {
        self.blocking.block(blocker_id, blocked_id).await
    }

    /// Remove a block.
    pub async fn unblock_user(&self, blocker_id: i64, blocked_id: i64) -> AppResult<()> {
        self.blocking.unblock(blocker_id, blocked_id).await
    }

    /// Get all friends of a user.
    pub async fn list_friends(&self, user_id: i64) -> AppResult<Vec<Friend>> {
        ensure_valid_id(user_id, "userId")?;

        let mut txn = self.store.begin().await?;
        let friendships = txn.list_friendships(user_id).await?;
        txn.commit().await?;

        Ok(friendships
            .iter()
            .map(|f| Friend::from_model(f, user_id))
            .collect())
    }

    /// Get friend requests a user has sent (paginated, newest first).
    pub async fn sent_requests(
        &self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        ensure_valid_id(user_id, "userId")?;

        let mut txn = self.store.begin().await?;
        let requests = txn.list_sent_friend_requests(user_id, page).await?;
        txn.commit().await?;
        Ok(requests)
    }

    /// Get friend requests a user has received (paginated, newest first).
    pub async fn received_requests(
        &self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        ensure_valid_id(user_id, "userId")?;

        let mut txn = self.store.begin().await?;
        let requests = txn.list_received_friend_requests(user_id, page).await?;
        txn.commit().await?;
        Ok(requests)
    }
}
