//! Blocking service.

use std::sync::Arc;

use tobaeki_common::{AppError, AppResult};
use tobaeki_db::entities::user_block;
use tracing::{debug, info};

use super::guards::{ensure_distinct, ensure_valid_id};
use crate::ledger::{BlockLedger, FriendshipLedger, LedgerStore, LedgerTxn, Page};

/// Blocking service for business logic.
pub struct BlockingService<S> {
    store: Arc<S>,
}

impl<S> Clone for BlockingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> BlockingService<S> {
    /// Create a new blocking service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Block a user.
    ///
    /// Any friendship between the two users is removed in the same
    /// transaction. Pending friend and participation requests are kept.
    pub async fn block(&self, blocker_id: i64, blocked_id: i64) -> AppResult<user_block::Model> {
        ensure_valid_id(blocker_id, "blockerId")?;
        ensure_valid_id(blocked_id, "blockedId")?;
        ensure_distinct(blocker_id, blocked_id, "Cannot block yourself")?;

        let mut txn = self.store.begin().await?;
        txn.lock_pair(blocker_id, blocked_id).await?;

        if txn.find_block(blocker_id, blocked_id).await?.is_some() {
            debug!(blocker_id, blocked_id, "Block rejected: already blocking");
            return Err(AppError::Conflict("Already blocking this user".to_string()));
        }

        // Blocking ends the friendship, whichever side blocks.
        let removed = match txn.find_friendship_between(blocker_id, blocked_id).await? {
            Some(friendship) => txn.delete_friendship(friendship.id).await?,
            None => false,
        };

        let block = txn.insert_block(blocker_id, blocked_id).await?;
        txn.commit().await?;

        info!(
            blocker_id,
            blocked_id,
            removed_friendship = removed,
            "User blocked"
        );
        Ok(block)
    }

    /// Unblock a user.
    pub async fn unblock(&self, blocker_id: i64, blocked_id: i64) -> AppResult<()> {
        ensure_valid_id(blocker_id, "blockerId")?;
        ensure_valid_id(blocked_id, "blockedId")?;

        let mut txn = self.store.begin().await?;
        txn.lock_pair(blocker_id, blocked_id).await?;

        let Some(block) = txn.find_block(blocker_id, blocked_id).await? else {
            return Err(AppError::NotFound("Not blocking this user".to_string()));
        };
        txn.delete_block(block.id).await?;
        txn.commit().await?;

        info!(blocker_id, blocked_id, "User unblocked");
        Ok(())
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_either_direction(&self, user_a: i64, user_b: i64) -> AppResult<bool> {
        let mut txn = self.store.begin().await?;
        let blocked = txn.is_blocked_between(user_a, user_b).await?;
        txn.commit().await?;
        Ok(blocked)
    }

    /// Get users that a user is blocking (paginated, newest first).
    pub async fn list_blocked(
        &self,
        blocker_id: i64,
        page: Page,
    ) -> AppResult<Vec<user_block::Model>> {
        ensure_valid_id(blocker_id, "blockerId")?;

        let mut txn = self.store.begin().await?;
        let blocks = txn.list_blocks(blocker_id, page).await?;
        txn.commit().await?;
        Ok(blocks)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ledger::MemoryStore;

    fn service() -> (Arc<MemoryStore>, BlockingService<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::clone(&store), BlockingService::new(store))
    }

    #[tokio::test]
    async fn test_cannot_block_yourself() {
        let (_, blocking) = service();
        let result = blocking.block(4, 4).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_duplicate_block_is_conflict() {
        let (_, blocking) = service();
        blocking.block(1, 2).await.unwrap();

        let result = blocking.block(1, 2).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reverse_block_is_allowed() {
        let (_, blocking) = service();
        blocking.block(1, 2).await.unwrap();
        blocking.block(2, 1).await.unwrap();

        assert!(blocking.is_blocked_either_direction(1, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_block_removes_friendship() {
        let (store, blocking) = service();
        {
            let mut txn = store.begin().await.unwrap();
            txn.insert_friendship(1, 2).await.unwrap();
            txn.commit().await.unwrap();
        }

        blocking.block(2, 1).await.unwrap();

        let mut txn = store.begin().await.unwrap();
        assert!(txn.find_friendship_between(1, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unblock_missing_edge_is_not_found() {
        let (_, blocking) = service();
        blocking.block(2, 1).await.unwrap();

        // The edge is directional: 1 never blocked 2.
        let result = blocking.unblock(1, 2).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unblock_clears_edge() {
        let (_, blocking) = service();
        blocking.block(1, 2).await.unwrap();

        blocking.unblock(1, 2).await.unwrap();

        assert!(!blocking.is_blocked_either_direction(1, 2).await.unwrap());
        assert!(blocking.list_blocked(1, Page::default()).await.unwrap().is_empty());
    }
}
