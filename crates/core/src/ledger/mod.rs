//! Ledger storage interfaces.
//!
//! Every ledger exposes `find`, `insert`, `delete` and `list` capabilities on
//! a transaction handle. A [`LedgerStore`] opens the transaction; the engine
//! commits it once all checks and writes of an operation succeeded. Dropping
//! a transaction without committing discards its writes.

mod database;
mod memory;

pub use database::{DatabaseStore, DatabaseTxn};
pub use memory::{MemoryStore, MemoryTxn};

use async_trait::async_trait;
use tobaeki_common::AppResult;
use tobaeki_db::entities::{
    friend_request, friendship, participant, participation_request, user_block,
};

/// One page of a newest-first listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u64,
    limit: u64,
}

impl Page {
    /// Items per page when the caller does not say.
    pub const DEFAULT_LIMIT: u64 = 10;
    /// Upper bound for `limit`.
    pub const MAX_LIMIT: u64 = 100;

    /// Create a page. `number` is 1-based; both values are clamped into range.
    #[must_use]
    pub fn new(number: u64, limit: u64) -> Self {
        Self {
            number: number.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// 1-based page number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Maximum number of items.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of items to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Directed block edges.
#[async_trait]
pub trait BlockLedger: Send {
    /// Find the edge `blocker -> blocked`.
    async fn find_block(
        &mut self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<Option<user_block::Model>>;

    /// Whether an edge exists in either direction.
    async fn is_blocked_between(&mut self, user_a: i64, user_b: i64) -> AppResult<bool>;

    /// Insert an edge. A duplicate edge is a `Conflict`.
    async fn insert_block(&mut self, blocker_id: i64, blocked_id: i64)
    -> AppResult<user_block::Model>;

    /// Delete an edge by ID. Returns whether it existed.
    async fn delete_block(&mut self, id: i64) -> AppResult<bool>;

    /// Outgoing edges of a blocker, newest first.
    async fn list_blocks(&mut self, blocker_id: i64, page: Page)
    -> AppResult<Vec<user_block::Model>>;
}

/// Pending, directional friend requests.
#[async_trait]
pub trait FriendRequestLedger: Send {
    /// Find a request by ID, claiming it for the rest of the transaction.
    async fn find_friend_request(&mut self, id: i64) -> AppResult<Option<friend_request::Model>>;

    /// Find the pending request between two users, in either direction.
    async fn find_friend_request_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friend_request::Model>>;

    /// Insert a request. Any request already pending for the pair is a `Conflict`.
    async fn insert_friend_request(
        &mut self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model>;

    /// Delete a request by ID. Returns whether it existed.
    async fn delete_friend_request(&mut self, id: i64) -> AppResult<bool>;

    /// Requests sent by a user, newest first.
    async fn list_sent_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>>;

    /// Requests received by a user, newest first.
    async fn list_received_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>>;
}

/// Confirmed, undirected friendships.
#[async_trait]
pub trait FriendshipLedger: Send {
    /// Find a friendship by ID, claiming it for the rest of the transaction.
    async fn find_friendship(&mut self, id: i64) -> AppResult<Option<friendship::Model>>;

    /// Find the friendship of a pair, in any order.
    async fn find_friendship_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friendship::Model>>;

    /// Insert a friendship for the pair. An existing friendship is a `Conflict`.
    async fn insert_friendship(&mut self, user_a: i64, user_b: i64)
    -> AppResult<friendship::Model>;

    /// Delete a friendship by ID. Returns whether it existed.
    async fn delete_friendship(&mut self, id: i64) -> AppResult<bool>;

    /// All friendships a user is part of, newest first.
    async fn list_friendships(&mut self, user_id: i64) -> AppResult<Vec<friendship::Model>>;
}

/// Pending join requests against trip posts.
#[async_trait]
pub trait ParticipationRequestLedger: Send {
    /// Find a request by ID, claiming it for the rest of the transaction.
    async fn find_participation_request(
        &mut self,
        id: i64,
    ) -> AppResult<Option<participation_request::Model>>;

    /// Find the pending request of a user for a post.
    async fn find_participation_request_for(
        &mut self,
        post_id: i64,
        requester_id: i64,
    ) -> AppResult<Option<participation_request::Model>>;

    /// Insert a request. A pending request for `(post, requester)` is a `Conflict`.
    async fn insert_participation_request(
        &mut self,
        post_id: i64,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<participation_request::Model>;

    /// Delete a request by ID. Returns whether it existed.
    async fn delete_participation_request(&mut self, id: i64) -> AppResult<bool>;

    /// Pending requests for a post, oldest first.
    async fn list_participation_requests(
        &mut self,
        post_id: i64,
    ) -> AppResult<Vec<participation_request::Model>>;
}

/// Confirmed membership of users in trip posts.
#[async_trait]
pub trait ParticipantLedger: Send {
    /// Find a participant by ID, claiming it for the rest of the transaction.
    async fn find_participant(&mut self, id: i64) -> AppResult<Option<participant::Model>>;

    /// Find the membership of a user in a post.
    async fn find_participant_for(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<Option<participant::Model>>;

    /// Insert a participant. An existing `(post, user)` membership is a `Conflict`.
    async fn insert_participant(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<participant::Model>;

    /// Delete a participant by ID. Returns whether it existed.
    async fn delete_participant(&mut self, id: i64) -> AppResult<bool>;

    /// Participants of a post, in joining order.
    async fn list_participants(&mut self, post_id: i64) -> AppResult<Vec<participant::Model>>;

    /// Memberships of a user, newest first.
    async fn list_participations(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<participant::Model>>;
}

/// Read access to trip post ownership.
#[async_trait]
pub trait PostDirectory: Send {
    /// The owner of a post, or `None` if the post does not exist.
    async fn find_post_owner(&mut self, post_id: i64) -> AppResult<Option<i64>>;
}

/// One unit of work spanning every ledger.
#[async_trait]
pub trait LedgerTxn:
    BlockLedger
    + FriendRequestLedger
    + FriendshipLedger
    + ParticipationRequestLedger
    + ParticipantLedger
    + PostDirectory
{
    /// Serialize this transaction against every other one touching the same
    /// unordered user pair, until commit or rollback.
    async fn lock_pair(&mut self, user_a: i64, user_b: i64) -> AppResult<()>;

    /// Make every write of this transaction visible.
    async fn commit(self) -> AppResult<()>;
}

/// Opens ledger transactions.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Transaction handle type.
    type Txn: LedgerTxn + 'static;

    /// Begin a transaction.
    async fn begin(&self) -> AppResult<Self::Txn>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_clamps() {
        let page = Page::new(0, 1_000);
        assert_eq!(page.number(), 1);
        assert_eq!(page.limit(), Page::MAX_LIMIT);
        assert_eq!(Page::new(2, 0).limit(), 1);
        assert_eq!(Page::default().limit(), Page::DEFAULT_LIMIT);
    }
}
