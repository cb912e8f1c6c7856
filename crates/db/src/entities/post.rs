//! Post entity (trip posts; only ownership is consulted here).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owner of the post
    pub user_id: i64,

    pub title: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participation_request::Entity")]
    ParticipationRequests,

    #[sea_orm(has_many = "super::participant::Entity")]
    Participants,
}

impl Related<super::participation_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ParticipationRequests.def()
    }
}

impl Related<super::participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
