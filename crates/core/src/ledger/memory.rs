//! In-process ledger store.
//!
//! A transaction holds the store lock for its whole lifetime and works on a
//! staged copy of the ledgers, so transactions are fully serialized and a
//! dropped transaction leaves no trace. The unique constraints of the
//! relational schema are enforced on insert.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use tobaeki_common::{AppError, AppResult};
use tobaeki_db::entities::{
    friend_request, friendship, participant, participation_request, user_block,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    BlockLedger, FriendRequestLedger, FriendshipLedger, LedgerStore, LedgerTxn, Page,
    ParticipantLedger, ParticipationRequestLedger, PostDirectory,
};

#[derive(Debug, Clone, Default)]
struct Ledgers {
    last_id: i64,
    post_owners: BTreeMap<i64, i64>,
    blocks: BTreeMap<i64, user_block::Model>,
    friend_requests: BTreeMap<i64, friend_request::Model>,
    friendships: BTreeMap<i64, friendship::Model>,
    participation_requests: BTreeMap<i64, participation_request::Model>,
    participants: BTreeMap<i64, participant::Model>,
}

impl Ledgers {
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Newest-first slice of `items` (which iterate oldest first).
fn newest_page<'a, T: Clone + 'a>(
    items: impl DoubleEndedIterator<Item = &'a T>,
    page: Page,
) -> Vec<T> {
    let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    items.rev().skip(skip).take(take).cloned().collect()
}

/// Ledger store kept in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    ledgers: Arc<Mutex<Ledgers>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trip post and its owner.
    pub async fn insert_post(&self, post_id: i64, owner_id: i64) {
        self.ledgers.lock().await.post_owners.insert(post_id, owner_id);
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Txn = MemoryTxn;

    async fn begin(&self) -> AppResult<MemoryTxn> {
        let shared = Arc::clone(&self.ledgers).lock_owned().await;
        let staged = shared.clone();
        Ok(MemoryTxn { shared, staged })
    }
}

/// Transaction over a [`MemoryStore`].
pub struct MemoryTxn {
    shared: OwnedMutexGuard<Ledgers>,
    staged: Ledgers,
}

#[async_trait]
impl BlockLedger for MemoryTxn {
    async fn find_block(
        &mut self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<Option<user_block::Model>> {
        Ok(self
            .staged
            .blocks
            .values()
            .find(|b| b.blocker_id == blocker_id && b.blocked_id == blocked_id)
            .cloned())
    }

    async fn is_blocked_between(&mut self, user_a: i64, user_b: i64) -> AppResult<bool> {
        Ok(self.staged.blocks.values().any(|b| {
            (b.blocker_id == user_a && b.blocked_id == user_b)
                || (b.blocker_id == user_b && b.blocked_id == user_a)
        }))
    }

    async fn insert_block(
        &mut self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<user_block::Model> {
        if self.find_block(blocker_id, blocked_id).await?.is_some() {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }
        let block = user_block::Model {
            id: self.staged.next_id(),
            blocker_id,
            blocked_id,
            created_at: now(),
        };
        self.staged.blocks.insert(block.id, block.clone());
        Ok(block)
    }

    async fn delete_block(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.staged.blocks.remove(&id).is_some())
    }

    async fn list_blocks(
        &mut self,
        blocker_id: i64,
        page: Page,
    ) -> AppResult<Vec<user_block::Model>> {
        let outgoing: Vec<_> = self
            .staged
            .blocks
            .values()
            .filter(|b| b.blocker_id == blocker_id)
            .collect();
        Ok(newest_page(outgoing.into_iter(), page))
    }
}

#[async_trait]
impl FriendRequestLedger for MemoryTxn {
    async fn find_friend_request(&mut self, id: i64) -> AppResult<Option<friend_request::Model>> {
        Ok(self.staged.friend_requests.get(&id).cloned())
    }

    async fn find_friend_request_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        Ok(self
            .staged
            .friend_requests
            .values()
            .find(|r| r.is_between(user_a, user_b))
            .cloned())
    }

    async fn insert_friend_request(
        &mut self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        if self
            .find_friend_request_between(requester_id, addressee_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }
        let request = friend_request::Model {
            id: self.staged.next_id(),
            requester_id,
            addressee_id,
            created_at: now(),
        };
        self.staged
            .friend_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn delete_friend_request(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.staged.friend_requests.remove(&id).is_some())
    }

    async fn list_sent_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        let sent: Vec<_> = self
            .staged
            .friend_requests
            .values()
            .filter(|r| r.requester_id == user_id)
            .collect();
        Ok(newest_page(sent.into_iter(), page))
    }

    async fn list_received_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        let received: Vec<_> = self
            .staged
            .friend_requests
            .values()
            .filter(|r| r.addressee_id == user_id)
            .collect();
        Ok(newest_page(received.into_iter(), page))
    }
}

#[async_trait]
impl FriendshipLedger for MemoryTxn {
    async fn find_friendship(&mut self, id: i64) -> AppResult<Option<friendship::Model>> {
        Ok(self.staged.friendships.get(&id).cloned())
    }

    async fn find_friendship_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friendship::Model>> {
        let (member_a, member_b) = friendship::ordered_pair(user_a, user_b);
        Ok(self
            .staged
            .friendships
            .values()
            .find(|f| f.member_a == member_a && f.member_b == member_b)
            .cloned())
    }

    async fn insert_friendship(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<friendship::Model> {
        if self.find_friendship_between(user_a, user_b).await?.is_some() {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }
        let (member_a, member_b) = friendship::ordered_pair(user_a, user_b);
        let friendship = friendship::Model {
            id: self.staged.next_id(),
            member_a,
            member_b,
            created_at: now(),
        };
        self.staged
            .friendships
            .insert(friendship.id, friendship.clone());
        Ok(friendship)
    }

    async fn delete_friendship(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.staged.friendships.remove(&id).is_some())
    }

    async fn list_friendships(&mut self, user_id: i64) -> AppResult<Vec<friendship::Model>> {
        Ok(self
            .staged
            .friendships
            .values()
            .rev()
            .filter(|f| f.involves(user_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParticipationRequestLedger for MemoryTxn {
    async fn find_participation_request(
        &mut self,
        id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        Ok(self.staged.participation_requests.get(&id).cloned())
    }

    async fn find_participation_request_for(
        &mut self,
        post_id: i64,
        requester_id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        Ok(self
            .staged
            .participation_requests
            .values()
            .find(|r| r.post_id == post_id && r.requester_id == requester_id)
            .cloned())
    }

    async fn insert_participation_request(
        &mut self,
        post_id: i64,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<participation_request::Model> {
        if self
            .find_participation_request_for(post_id, requester_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }
        let request = participation_request::Model {
            id: self.staged.next_id(),
            post_id,
            requester_id,
            addressee_id,
            created_at: now(),
        };
        self.staged
            .participation_requests
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn delete_participation_request(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.staged.participation_requests.remove(&id).is_some())
    }

    async fn list_participation_requests(
        &mut self,
        post_id: i64,
    ) -> AppResult<Vec<participation_request::Model>> {
        Ok(self
            .staged
            .participation_requests
            .values()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParticipantLedger for MemoryTxn {
    async fn find_participant(&mut self, id: i64) -> AppResult<Option<participant::Model>> {
        Ok(self.staged.participants.get(&id).cloned())
    }

    async fn find_participant_for(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<Option<participant::Model>> {
        Ok(self
            .staged
            .participants
            .values()
            .find(|p| p.post_id == post_id && p.user_id == user_id)
            .cloned())
    }

    async fn insert_participant(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<participant::Model> {
        if self.find_participant_for(post_id, user_id).await?.is_some() {
            return Err(AppError::Conflict("Relationship already exists".to_string()));
        }
        let joined_at = now();
        let participant = participant::Model {
            id: self.staged.next_id(),
            post_id,
            user_id,
            created_at: joined_at,
            updated_at: joined_at,
        };
        self.staged
            .participants
            .insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn delete_participant(&mut self, id: i64) -> AppResult<bool> {
        Ok(self.staged.participants.remove(&id).is_some())
    }

    async fn list_participants(&mut self, post_id: i64) -> AppResult<Vec<participant::Model>> {
        Ok(self
            .staged
            .participants
            .values()
            .filter(|p| p.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn list_participations(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<participant::Model>> {
        let joined: Vec<_> = self
            .staged
            .participants
            .values()
            .filter(|p| p.user_id == user_id)
            .collect();
        Ok(newest_page(joined.into_iter(), page))
    }
}

#[async_trait]
impl PostDirectory for MemoryTxn {
    async fn find_post_owner(&mut self, post_id: i64) -> AppResult<Option<i64>> {
        Ok(self.staged.post_owners.get(&post_id).copied())
    }
}

#[async_trait]
impl LedgerTxn for MemoryTxn {
    async fn lock_pair(&mut self, _user_a: i64, _user_b: i64) -> AppResult<()> {
        // The store lock already serializes every transaction.
        Ok(())
    }

    async fn commit(mut self) -> AppResult<()> {
        *self.shared = std::mem::take(&mut self.staged);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_committed_writes_are_visible() {
        let store = MemoryStore::new();

        let mut txn = store.begin().await.unwrap();
        let block = txn.insert_block(1, 2).await.unwrap();
        txn.commit().await.unwrap();

        let mut txn = store.begin().await.unwrap();
        assert_eq!(txn.find_block(1, 2).await.unwrap(), Some(block));
        assert!(txn.is_blocked_between(2, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut txn = store.begin().await.unwrap();
            txn.insert_friend_request(1, 2).await.unwrap();
        }

        let mut txn = store.begin().await.unwrap();
        assert!(txn.find_friend_request_between(1, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_friend_request_is_conflict() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();

        txn.insert_friend_request(1, 2).await.unwrap();
        let result = txn.insert_friend_request(2, 1).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_friendship_pair_is_normalized() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();

        let friendship = txn.insert_friendship(7, 3).await.unwrap();

        assert_eq!((friendship.member_a, friendship.member_b), (3, 7));
        assert!(txn.find_friendship_between(3, 7).await.unwrap().is_some());
        assert!(matches!(
            txn.insert_friendship(3, 7).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_blocks_newest_first() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();
        for blocked in 2..=5 {
            txn.insert_block(1, blocked).await.unwrap();
        }

        let first = txn.list_blocks(1, Page::new(1, 3)).await.unwrap();
        let second = txn.list_blocks(1, Page::new(2, 3)).await.unwrap();

        let blocked: Vec<_> = first.iter().map(|b| b.blocked_id).collect();
        assert_eq!(blocked, vec![5, 4, 3]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].blocked_id, 2);
    }

    #[tokio::test]
    async fn test_post_owner_lookup() {
        let store = MemoryStore::new();
        store.insert_post(5, 9).await;

        let mut txn = store.begin().await.unwrap();
        assert_eq!(txn.find_post_owner(5).await.unwrap(), Some(9));
        assert_eq!(txn.find_post_owner(6).await.unwrap(), None);
    }
}
