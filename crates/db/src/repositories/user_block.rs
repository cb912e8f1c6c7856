//! User block repository.

use crate::entities::{UserBlock, user_block};
use crate::map_db_err;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tobaeki_common::AppResult;

/// User block repository for database operations.
pub struct UserBlockRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserBlockRepository<'a, C> {
    /// Create a new user block repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a block by blocker and blocked user.
    pub async fn find_by_pair(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> AppResult<Option<user_block::Model>> {
        UserBlock::find()
            .filter(user_block::Column::BlockerId.eq(blocker_id))
            .filter(user_block::Column::BlockedId.eq(blocked_id))
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Check if either user is blocking the other.
    pub async fn is_blocked_between(&self, user_a: i64, user_b: i64) -> AppResult<bool> {
        let found = UserBlock::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(user_block::Column::BlockerId.eq(user_a))
                            .add(user_block::Column::BlockedId.eq(user_b)),
                    )
                    .add(
                        Condition::all()
                            .add(user_block::Column::BlockerId.eq(user_b))
                            .add(user_block::Column::BlockedId.eq(user_a)),
                    ),
            )
            .one(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }

    /// Create a new block.
    pub async fn create(&self, model: user_block::ActiveModel) -> AppResult<user_block::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }

    /// Delete a block. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = UserBlock::delete_by_id(id)
            .exec(self.conn)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected > 0)
    }

    /// Get users that a user is blocking (paginated, newest first).
    pub async fn find_blocking(
        &self,
        blocker_id: i64,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user_block::Model>> {
        UserBlock::find()
            .filter(user_block::Column::BlockerId.eq(blocker_id))
            .order_by_desc(user_block::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.conn)
            .await
            .map_err(map_db_err)
    }
}
