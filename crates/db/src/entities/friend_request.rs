//! Friend request entity (pending, directional friend requests).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friend_request")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who sent the request
    pub requester_id: i64,

    /// The user who received the request
    pub addressee_id: i64,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this request is between the two users, in either direction.
    #[must_use]
    pub const fn is_between(&self, user_a: i64, user_b: i64) -> bool {
        (self.requester_id == user_a && self.addressee_id == user_b)
            || (self.requester_id == user_b && self.addressee_id == user_a)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
