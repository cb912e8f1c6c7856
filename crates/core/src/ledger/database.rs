//! `PostgreSQL` ledger store backed by the tobaeki repositories.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    Set, Statement, TransactionTrait,
};
use tobaeki_common::AppResult;
use tobaeki_db::{
    entities::{friend_request, friendship, participant, participation_request, user_block},
    map_db_err,
    repositories::{
        FriendRequestRepository, FriendshipRepository, ParticipantRepository,
        ParticipationRequestRepository, PostRepository, UserBlockRepository,
    },
};

use super::{
    BlockLedger, FriendRequestLedger, FriendshipLedger, LedgerStore, LedgerTxn, Page,
    ParticipantLedger, ParticipationRequestLedger, PostDirectory,
};

/// Transaction-scoped advisory lock keyed on a normalized user pair.
const PAIR_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// Ledger store over a database connection pool.
///
/// Every transaction runs at `READ COMMITTED`. Row locks on the records being
/// consumed and the pair lock serialize conflicting writers, and unique
/// indexes turn the remaining races into `Conflict` errors.
#[derive(Clone)]
pub struct DatabaseStore {
    db: Arc<DatabaseConnection>,
}

impl DatabaseStore {
    /// Isolation level of every relationship transaction.
    pub const ISOLATION: IsolationLevel = IsolationLevel::ReadCommitted;

    /// Create a new database store.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LedgerStore for DatabaseStore {
    type Txn = DatabaseTxn;

    async fn begin(&self) -> AppResult<DatabaseTxn> {
        let txn = self
            .db
            .begin_with_config(Some(Self::ISOLATION), None)
            .await
            .map_err(map_db_err)?;
        Ok(DatabaseTxn { txn })
    }
}

/// An open database transaction. Rolled back on drop unless committed.
pub struct DatabaseTxn {
    txn: DatabaseTransaction,
}

#[async_trait]
impl BlockLedger for DatabaseTxn {
    async fn find_block(
        &mut self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<Option<user_block::Model>> {
        UserBlockRepository::new(&self.txn)
            .find_by_pair(blocker_id, blocked_id)
            .await
    }

    async fn is_blocked_between(&mut self, user_a: i64, user_b: i64) -> AppResult<bool> {
        UserBlockRepository::new(&self.txn)
            .is_blocked_between(user_a, user_b)
            .await
    }

    async fn insert_block(
        &mut self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<user_block::Model> {
        let model = user_block::ActiveModel {
            blocker_id: Set(blocker_id),
            blocked_id: Set(blocked_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        UserBlockRepository::new(&self.txn).create(model).await
    }

    async fn delete_block(&mut self, id: i64) -> AppResult<bool> {
        UserBlockRepository::new(&self.txn).delete(id).await
    }

    async fn list_blocks(
        &mut self,
        blocker_id: i64,
        page: Page,
    ) -> AppResult<Vec<user_block::Model>> {
        UserBlockRepository::new(&self.txn)
            .find_blocking(blocker_id, page.limit(), page.offset())
            .await
    }
}

#[async_trait]
impl FriendRequestLedger for DatabaseTxn {
    async fn find_friend_request(&mut self, id: i64) -> AppResult<Option<friend_request::Model>> {
        FriendRequestRepository::new(&self.txn)
            .find_by_id_for_update(id)
            .await
    }

    async fn find_friend_request_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequestRepository::new(&self.txn)
            .find_between(user_a, user_b)
            .await
    }

    async fn insert_friend_request(
        &mut self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        let model = friend_request::ActiveModel {
            requester_id: Set(requester_id),
            addressee_id: Set(addressee_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        FriendRequestRepository::new(&self.txn).create(model).await
    }

    async fn delete_friend_request(&mut self, id: i64) -> AppResult<bool> {
        FriendRequestRepository::new(&self.txn).delete(id).await
    }

    async fn list_sent_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequestRepository::new(&self.txn)
            .find_sent(user_id, page.limit(), page.offset())
            .await
    }

    async fn list_received_friend_requests(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequestRepository::new(&self.txn)
            .find_received(user_id, page.limit(), page.offset())
            .await
    }
}

#[async_trait]
impl FriendshipLedger for DatabaseTxn {
    async fn find_friendship(&mut self, id: i64) -> AppResult<Option<friendship::Model>> {
        FriendshipRepository::new(&self.txn)
            .find_by_id_for_update(id)
            .await
    }

    async fn find_friendship_between(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friendship::Model>> {
        FriendshipRepository::new(&self.txn)
            .find_by_pair(user_a, user_b)
            .await
    }

    async fn insert_friendship(
        &mut self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<friendship::Model> {
        let (member_a, member_b) = friendship::ordered_pair(user_a, user_b);
        let model = friendship::ActiveModel {
            member_a: Set(member_a),
            member_b: Set(member_b),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        FriendshipRepository::new(&self.txn).create(model).await
    }

    async fn delete_friendship(&mut self, id: i64) -> AppResult<bool> {
        FriendshipRepository::new(&self.txn).delete(id).await
    }

    async fn list_friendships(&mut self, user_id: i64) -> AppResult<Vec<friendship::Model>> {
        FriendshipRepository::new(&self.txn)
            .find_by_user(user_id)
            .await
    }
}

#[async_trait]
impl ParticipationRequestLedger for DatabaseTxn {
    async fn find_participation_request(
        &mut self,
        id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        ParticipationRequestRepository::new(&self.txn)
            .find_by_id_for_update(id)
            .await
    }

    async fn find_participation_request_for(
        &mut self,
        post_id: i64,
        requester_id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        ParticipationRequestRepository::new(&self.txn)
            .find_by_post_and_requester(post_id, requester_id)
            .await
    }

    async fn insert_participation_request(
        &mut self,
        post_id: i64,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<participation_request::Model> {
        let model = participation_request::ActiveModel {
            post_id: Set(post_id),
            requester_id: Set(requester_id),
            addressee_id: Set(addressee_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        ParticipationRequestRepository::new(&self.txn)
            .create(model)
            .await
    }

    async fn delete_participation_request(&mut self, id: i64) -> AppResult<bool> {
        ParticipationRequestRepository::new(&self.txn)
            .delete(id)
            .await
    }

    async fn list_participation_requests(
        &mut self,
        post_id: i64,
    ) -> AppResult<Vec<participation_request::Model>> {
        ParticipationRequestRepository::new(&self.txn)
            .find_by_post(post_id)
            .await
    }
}

#[async_trait]
impl ParticipantLedger for DatabaseTxn {
    async fn find_participant(&mut self, id: i64) -> AppResult<Option<participant::Model>> {
        ParticipantRepository::new(&self.txn)
            .find_by_id_for_update(id)
            .await
    }

    async fn find_participant_for(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<Option<participant::Model>> {
        ParticipantRepository::new(&self.txn)
            .find_by_post_and_user(post_id, user_id)
            .await
    }

    async fn insert_participant(
        &mut self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<participant::Model> {
        let now = Utc::now();
        let model = participant::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        ParticipantRepository::new(&self.txn).create(model).await
    }

    async fn delete_participant(&mut self, id: i64) -> AppResult<bool> {
        ParticipantRepository::new(&self.txn).delete(id).await
    }

    async fn list_participants(&mut self, post_id: i64) -> AppResult<Vec<participant::Model>> {
        ParticipantRepository::new(&self.txn)
            .find_by_post(post_id)
            .await
    }

    async fn list_participations(
        &mut self,
        user_id: i64,
        page: Page,
    ) -> AppResult<Vec<participant::Model>> {
        ParticipantRepository::new(&self.txn)
            .find_by_user(user_id, page.limit(), page.offset())
            .await
    }
}

#[async_trait]
impl PostDirectory for DatabaseTxn {
    async fn find_post_owner(&mut self, post_id: i64) -> AppResult<Option<i64>> {
        let post = PostRepository::new(&self.txn).find_by_id(post_id).await?;
        Ok(post.map(|p| p.user_id))
    }
}

#[async_trait]
impl LedgerTxn for DatabaseTxn {
    async fn lock_pair(&mut self, user_a: i64, user_b: i64) -> AppResult<()> {
        let (low, high) = friendship::ordered_pair(user_a, user_b);
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            PAIR_LOCK_SQL,
            [format!("pair:{low}:{high}").into()],
        );
        self.txn.execute(stmt).await.map_err(map_db_err)?;
        Ok(())
    }

    async fn commit(self) -> AppResult<()> {
        self.txn.commit().await.map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{MockDatabase, MockExecResult, Transaction};

    fn block(id: i64, blocker_id: i64, blocked_id: i64) -> user_block::Model {
        user_block::Model {
            id,
            blocker_id,
            blocked_id,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_insert_block_commits() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[block(1, 1, 2)]])
            .into_connection();
        let store = DatabaseStore::new(Arc::new(db));

        let mut txn = store.begin().await.unwrap();
        let created = txn.insert_block(1, 2).await.unwrap();
        txn.commit().await.unwrap();

        assert_eq!(created.blocked_id, 2);
    }

    #[tokio::test]
    async fn test_lock_pair_uses_normalized_key() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let store = DatabaseStore::new(Arc::clone(&db));

        let mut txn = store.begin().await.unwrap();
        txn.lock_pair(9, 4).await.unwrap();
        txn.commit().await.unwrap();
        drop(store);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(
            log,
            [Transaction::many([
                Statement::from_string(DatabaseBackend::Postgres, "BEGIN"),
                Statement::from_sql_and_values(
                    DatabaseBackend::Postgres,
                    PAIR_LOCK_SQL,
                    ["pair:4:9".into()]
                ),
                Statement::from_string(DatabaseBackend::Postgres, "COMMIT"),
            ])]
        );
    }

    #[test]
    fn test_transactions_run_read_committed() {
        assert_eq!(DatabaseStore::ISOLATION, IsolationLevel::ReadCommitted);
    }
}
