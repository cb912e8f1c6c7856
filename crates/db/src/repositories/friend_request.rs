//! Friend request repository.

use crate::entities::{FriendRequest, friend_request};
use crate::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tobaeki_common::AppResult;

/// Friend request repository for database operations.
pub struct FriendRequestRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FriendRequestRepository<'a, C> {
    /// Create a new friend request repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a friend request by ID and lock the row until the transaction ends.
    pub async fn find_by_id_for_update(
        &self,
        id: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Find a pending request between two users, in either direction.
    pub async fn find_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(friend_request::Column::RequesterId.eq(user_a))
                            .add(friend_request::Column::AddresseeId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(friend_request::Column::RequesterId.eq(user_b))
                            .add(friend_request::Column::AddresseeId.eq(user_a)),
                    ),
            )
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new friend request.
    pub async fn create(
        &self,
        model: friend_request::ActiveModel,
    ) -> AppResult<friend_request::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }

    /// Delete a friend request. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = FriendRequest::delete_by_id(id)
            .exec(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Get requests sent by a user (paginated, newest first).
    pub async fn find_sent(
        &self,
        user_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::RequesterId.eq(user_id))
            .order_by_desc(friend_request::Column::CreatedAt)
            .order_by_desc(friend_request::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Get requests received by a user (paginated, newest first).
    pub async fn find_received(
        &self,
        user_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<friend_request::Model>> {
        FriendRequest::find()
            .filter(friend_request::Column::AddresseeId.eq(user_id))
            .order_by_desc(friend_request::Column::CreatedAt)
            .order_by_desc(friend_request::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await
            .map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_request(id: i64, requester_id: i64, addressee_id: i64) -> friend_request::Model {
        friend_request::Model {
            id,
            requester_id,
            addressee_id,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_for_update_found() {
        let request = create_test_request(1, 1, 2);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request.clone()]])
            .into_connection();

        let repo = FriendRequestRepository::new(&db);
        let found = repo.find_by_id_for_update(1).await.unwrap().unwrap();

        assert_eq!(found, request);
    }

    #[tokio::test]
    async fn test_find_by_id_for_update_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<friend_request::Model>::new()])
            .into_connection();

        let repo = FriendRequestRepository::new(&db);
        assert!(repo.find_by_id_for_update(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_between_matches_reverse_direction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_request(5, 2, 1)]])
            .into_connection();

        let repo = FriendRequestRepository::new(&db);
        let found = repo.find_between(1, 2).await.unwrap().unwrap();

        assert!(found.is_between(1, 2));
        assert_eq!(found.requester_id, 2);
    }

    #[tokio::test]
    async fn test_find_received() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_request(3, 2, 1), create_test_request(2, 3, 1)]])
            .into_connection();

        let repo = FriendRequestRepository::new(&db);
        let result = repo.find_received(1, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.addressee_id == 1));
    }
}
