//! Participant repository.

use crate::entities::{Participant, participant};
use crate::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tobaeki_common::AppResult;

/// Participant repository for database operations.
pub struct ParticipantRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ParticipantRepository<'a, C> {
    /// Create a new participant repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a participant by ID and lock the row until the transaction ends.
    pub async fn find_by_id_for_update(&self, id: i64) -> AppResult<Option<participant::Model>> {
        Participant::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Find the membership of a user in a post.
    pub async fn find_by_post_and_user(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> AppResult<Option<participant::Model>> {
        Participant::find()
            .filter(participant::Column::PostId.eq(post_id))
            .filter(participant::Column::UserId.eq(user_id))
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new participant.
    pub async fn create(&self, model: participant::ActiveModel) -> AppResult<participant::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }

    /// Delete a participant. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = Participant::delete_by_id(id)
            .exec(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Get all participants of a post, in joining order.
    pub async fn find_by_post(&self, post_id: i64) -> AppResult<Vec<participant::Model>> {
        Participant::find()
            .filter(participant::Column::PostId.eq(post_id))
            .order_by_asc(participant::Column::Id)
            .all(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Get all participations of a user (newest first).
    pub async fn find_by_user(
        &self,
        user_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<participant::Model>> {
        Participant::find()
            .filter(participant::Column::UserId.eq(user_id))
            .order_by_desc(participant::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await
            .map_err(map_db_err)
    }
}
