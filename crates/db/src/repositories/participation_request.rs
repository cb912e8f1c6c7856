//! Participation request repository.

use crate::entities::{ParticipationRequest, participation_request};
use crate::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tobaeki_common::AppResult;

/// Participation request repository for database operations.
pub struct ParticipationRequestRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ParticipationRequestRepository<'a, C> {
    /// Create a new participation request repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a participation request by ID and lock the row until the transaction ends.
    pub async fn find_by_id_for_update(
        &self,
        id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        ParticipationRequest::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Find the pending request of a user for a post.
    pub async fn find_by_post_and_requester(
        &self,
        post_id: i64,
        requester_id: i64,
    ) -> AppResult<Option<participation_request::Model>> {
        ParticipationRequest::find()
            .filter(participation_request::Column::PostId.eq(post_id))
            .filter(participation_request::Column::RequesterId.eq(requester_id))
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new participation request.
    pub async fn create(
        &self,
        model: participation_request::ActiveModel,
    ) -> AppResult<participation_request::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }

    /// Delete a participation request. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = ParticipationRequest::delete_by_id(id)
            .exec(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Get pending requests for a post, oldest first.
    pub async fn find_by_post(
        &self,
        post_id: i64,
    ) -> AppResult<Vec<participation_request::Model>> {
        ParticipationRequest::find()
            .filter(participation_request::Column::PostId.eq(post_id))
            .order_by_asc(participation_request::Column::Id)
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

    #[tokio::test]
    async fn test_find_by_post_and_requester() {
        let request = participation_request::Model {
            id: 1,
            post_id: 5,
            requester_id: 3,
            addressee_id: 9,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request]])
            .into_connection();

        let repo = ParticipationRequestRepository::new(&db);
        let found = repo.find_by_post_and_requester(5, 3).await.unwrap().unwrap();

        assert_eq!(found.addressee_id, 9);
    }
}
