//! Trip participation service.
//!
//! Only the post owner's block against the requester matters here: a
//! requester who blocks the owner may still ask to join.

use std::sync::Arc;

use tobaeki_common::{AppError, AppResult};
use tobaeki_db::entities::{participant, participation_request};
use tracing::{debug, info};

use super::guards::{ensure_valid_id, require};
use crate::ledger::{
    BlockLedger, LedgerStore, LedgerTxn, Page, ParticipantLedger, ParticipationRequestLedger,
    PostDirectory,
};

/// Participation service for business logic.
pub struct ParticipationService<S> {
    store: Arc<S>,
}

impl<S> Clone for ParticipationService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LedgerStore> ParticipationService<S> {
    /// Create a new participation service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Ask to join a trip post. The request is addressed to the post owner.
    pub async fn create_request(
        &self,
        post_id: i64,
        requester_id: i64,
    ) -> AppResult<participation_request::Model> {
        ensure_valid_id(post_id, "postId")?;
        ensure_valid_id(requester_id, "requesterId")?;

        let mut txn = self.store.begin().await?;
        let owner_id = require(txn.find_post_owner(post_id).await?, "Post")?;

        if requester_id == owner_id {
            return Err(AppError::InvalidArgument(
                "Cannot request to join your own post".to_string(),
            ));
        }

        txn.lock_pair(owner_id, requester_id).await?;

        if txn.find_block(owner_id, requester_id).await?.is_some() {
            debug!(post_id, requester_id, "Participation request rejected: blocked by owner");
            return Err(AppError::BlockedRelationship(
                "The post owner has blocked this user".to_string(),
            ));
        }

        if txn
            .find_participant_for(post_id, requester_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Already participating in this post".to_string(),
            ));
        }

        if txn
            .find_participation_request_for(post_id, requester_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A participation request for this post is already pending".to_string(),
            ));
        }

        let request = txn
            .insert_participation_request(post_id, requester_id, owner_id)
            .await?;
        txn.commit().await?;

        info!(
            request_id = request.id,
            post_id,
            requester_id,
            "Participation request created"
        );
        Ok(request)
    }

    /// Accept a participation request, replacing it with a participant.
    pub async fn accept_request(&self, request_id: i64) -> AppResult<participant::Model> {
        ensure_valid_id(request_id, "requestId")?;

        let mut txn = self.store.begin().await?;
        let request = require(
            txn.find_participation_request(request_id).await?,
            "Participation request",
        )?;
        txn.lock_pair(request.addressee_id, request.requester_id)
            .await?;

        if txn
            .find_block(request.addressee_id, request.requester_id)
            .await?
            .is_some()
        {
            debug!(request_id, "Participation acceptance rejected: blocked by owner");
            return Err(AppError::BlockedRelationship(
                "Cannot accept a request from a blocked user".to_string(),
            ));
        }

        txn.delete_participation_request(request.id).await?;
        let participant = txn
            .insert_participant(request.post_id, request.requester_id)
            .await?;
        txn.commit().await?;

        info!(
            request_id,
            participant_id = participant.id,
            post_id = participant.post_id,
            "Participation request accepted"
        );
        Ok(participant)
    }

    /// Decline a participation request. Also used by the requester to withdraw it.
    pub async fn decline_request(&self, request_id: i64) -> AppResult<()> {
        ensure_valid_id(request_id, "requestId")?;

        let mut txn = self.store.begin().await?;
        let request = require(
            txn.find_participation_request(request_id).await?,
            "Participation request",
        )?;
        txn.delete_participation_request(request.id).await?;
        txn.commit().await?;

        info!(request_id, "Participation request declined");
        Ok(())
    }

    /// Get the participants of a post.
    pub async fn list_participants(&self, post_id: i64) -> AppResult<Vec<participant::Model>> {
        ensure_valid_id(post_id, "postId")?;

        let mut txn = self.store.begin().await?;
        let participants = txn.list_participants(post_id).await?;
        txn.commit().await?;
        Ok(participants)
    }

    /// Leave a post, or remove a participant from it.
    pub async fn cancel_participation(&self, participant_id: i64) -> AppResult<()> {
        ensure_valid_id(participant_id, "participantId")?;

        let mut txn = self.store.begin().await?;
        let participant = require(txn.find_participant(participant_id).await?, "Participant")?;
        txn.delete_participant(participant.id).await?;
        txn.commit().await?;

        info!(
            participant_id,
            post_id = participant.post_id,
            "Participation cancelled"
        );
        Ok(())
    }

    /// Get the pending requests for a post.
    pub async fn list_requests(
        &self,
        post_id: i64,
    ) -> AppResult<Vec<participation_request::Model>> {
        ensure_valid_id(post_id, "postId")?;

        let mut txn = self.store.begin().await?;
        let requests = txn.list_participation_requests(post_id).await?;
        txn.commit().await?;
        Ok(requests)
    }

    /// Get the posts a user participates in (paginated, newest first).
    pub async fn list_participations(
        &self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<participant::Model>> {
        ensure_valid_id(user_id, "userId")?;

        let mut txn = self.store.begin().await?;
        let participations = txn.list_participations(user_id, page).await?;
        txn.commit().await?;
        Ok(participations)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ledger::MemoryStore;

    const POST: i64 = 5;
    const OWNER: i64 = 9;

    async fn service() -> (Arc<MemoryStore>, ParticipationService<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert_post(POST, OWNER).await;
        (Arc::clone(&store), ParticipationService::new(store))
    }

    async fn block(store: &MemoryStore, blocker_id: i64, blocked_id: i64) {
        let mut txn = store.begin().await.unwrap();
        txn.insert_block(blocker_id, blocked_id).await.unwrap();
        txn.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_request_is_addressed_to_owner() {
        let (_, participation) = service().await;

        let request = participation.create_request(POST, 3).await.unwrap();

        assert_eq!(request.addressee_id, OWNER);
        assert_eq!(request.requester_id, 3);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let (_, participation) = service().await;
        let result = participation.create_request(42, 3).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_request_own_post() {
        let (_, participation) = service().await;
        let result = participation.create_request(POST, OWNER).await;
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_owner_block_rejects_request() {
        let (store, participation) = service().await;
        block(&store, OWNER, 3).await;

        let result = participation.create_request(POST, 3).await;

        assert!(matches!(result, Err(AppError::BlockedRelationship(_))));
    }

    #[tokio::test]
    async fn test_requester_block_does_not_reject_request() {
        let (store, participation) = service().await;
        block(&store, 3, OWNER).await;

        assert!(participation.create_request(POST, 3).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_request_is_conflict() {
        let (_, participation) = service().await;
        participation.create_request(POST, 3).await.unwrap();

        let result = participation.create_request(POST, 3).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_accept_moves_request_to_participants() {
        let (_, participation) = service().await;
        let request = participation.create_request(POST, 3).await.unwrap();

        let participant = participation.accept_request(request.id).await.unwrap();

        assert_eq!((participant.post_id, participant.user_id), (POST, 3));
        assert!(participation.list_requests(POST).await.unwrap().is_empty());
        assert_eq!(
            participation.list_participants(POST).await.unwrap(),
            vec![participant]
        );
        assert!(matches!(
            participation.create_request(POST, 3).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_accept_rechecks_owner_block() {
        let (store, participation) = service().await;
        let request = participation.create_request(POST, 3).await.unwrap();
        block(&store, OWNER, 3).await;

        let result = participation.accept_request(request.id).await;

        assert!(matches!(result, Err(AppError::BlockedRelationship(_))));
        assert!(participation.list_participants(POST).await.unwrap().is_empty());
        assert_eq!(participation.list_requests(POST).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decline_removes_request() {
        let (_, participation) = service().await;
        let request = participation.create_request(POST, 3).await.unwrap();

        participation.decline_request(request.id).await.unwrap();

        assert!(participation.list_requests(POST).await.unwrap().is_empty());
        assert!(matches!(
            participation.accept_request(request.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_participation() {
        let (_, participation) = service().await;
        let request = participation.create_request(POST, 3).await.unwrap();
        let participant = participation.accept_request(request.id).await.unwrap();

        participation
            .cancel_participation(participant.id)
            .await
            .unwrap();

        assert!(
            participation
                .list_participations(3, Page::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            participation.cancel_participation(participant.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_post_lists_nothing() {
        let (_, participation) = service().await;
        assert!(participation.list_participants(POST).await.unwrap().is_empty());
        assert!(participation.list_requests(POST).await.unwrap().is_empty());
    }
}
