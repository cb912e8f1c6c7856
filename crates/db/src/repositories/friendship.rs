//! Friendship repository.

use crate::entities::{Friendship, friendship};
use crate::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tobaeki_common::AppResult;

/// Friendship repository for database operations.
pub struct FriendshipRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> FriendshipRepository<'a, C> {
    /// Create a new friendship repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a friendship by ID and lock the row until the transaction ends.
    pub async fn find_by_id_for_update(&self, id: i64) -> AppResult<Option<friendship::Model>> {
        Friendship::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Find the friendship between two users, in any order.
    pub async fn find_by_pair(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> AppResult<Option<friendship::Model>> {
        let (member_a, member_b) = friendship::ordered_pair(user_a, user_b);
        Friendship::find()
            .filter(friendship::Column::MemberA.eq(member_a))
            .filter(friendship::Column::MemberB.eq(member_b))
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new friendship.
    pub async fn create(&self, model: friendship::ActiveModel) -> AppResult<friendship::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }

    /// Delete a friendship. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = Friendship::delete_by_id(id)
            .exec(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Get all friendships a user is part of.
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<friendship::Model>> {
        Friendship::find()
            .filter(
                Condition::any()
                    .add(friendship::Column::MemberA.eq(user_id))
                    .add(friendship::Column::MemberB.eq(user_id)),
            )
            .order_by_desc(friendship::Column::Id)
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_friendship(id: i64, member_a: i64, member_b: i64) -> friendship::Model {
        friendship::Model {
            id,
            member_a,
            member_b,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_pair_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_friendship(1, 1, 2)]])
            .into_connection();

        let repo = FriendshipRepository::new(&db);
        let found = repo.find_by_pair(2, 1).await.unwrap();

        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_find_by_pair_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<friendship::Model>::new()])
            .into_connection();

        let repo = FriendshipRepository::new(&db);
        assert!(repo.find_by_pair(1, 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = FriendshipRepository::new(&db);
        assert!(repo.delete(1).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_friendship(2, 1, 5), create_test_friendship(1, 0, 1)]])
            .into_connection();

        let repo = FriendshipRepository::new(&db);
        let result = repo.find_by_user(1).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|f| f.involves(1)));
    }
}
