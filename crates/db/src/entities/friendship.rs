//! Friendship entity (confirmed, undirected friendships).
//!
//! Members are stored normalized (`member_a < member_b`) so that a pair maps
//! to exactly one row no matter who sent the original request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendship")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The lower user ID of the pair
    pub member_a: i64,

    /// The higher user ID of the pair
    pub member_b: i64,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the user is one of the two members.
    #[must_use]
    pub const fn involves(&self, user_id: i64) -> bool {
        self.member_a == user_id || self.member_b == user_id
    }

    /// The member that is not `user_id`.
    #[must_use]
    pub const fn other_member(&self, user_id: i64) -> i64 {
        if self.member_a == user_id {
            self.member_b
        } else {
            self.member_a
        }
    }
}

/// Order a pair of user IDs the way friendships are stored.
#[must_use]
pub const fn ordered_pair(user_a: i64, user_b: i64) -> (i64, i64) {
    if user_a <= user_b {
        (user_a, user_b)
    } else {
        (user_b, user_a)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_pair_is_order_independent() {
        assert_eq!(ordered_pair(7, 3), (3, 7));
        assert_eq!(ordered_pair(3, 7), (3, 7));
    }

    #[test]
    fn test_other_member() {
        let friendship = Model {
            id: 1,
            member_a: 3,
            member_b: 7,
            created_at: chrono::Utc::now().into(),
        };
        assert!(friendship.involves(7));
        assert!(!friendship.involves(5));
        assert_eq!(friendship.other_member(3), 7);
        assert_eq!(friendship.other_member(7), 3);
    }
}
