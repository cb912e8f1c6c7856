//! Post repository.

use crate::entities::{Post, post};
use crate::map_db_err;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait};
use tobaeki_common::AppResult;

/// Post repository for database operations.
pub struct PostRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PostRepository<'a, C> {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.conn)
            .await
            .map_err(map_db_err)
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.insert(self.conn).await.map_err(map_db_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_by_id_returns_owner() {
        let post = post::Model {
            id: 5,
            user_id: 9,
            title: "Jeju road trip".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[post]])
            .into_connection();

        let repo = PostRepository::new(&db);
        let found = repo.find_by_id(5).await.unwrap().unwrap();

        assert_eq!(found.user_id, 9);
    }
}
