//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20240827_000001_create_post_table;
mod m20240827_000002_create_user_block_table;
mod m20240827_000003_create_friend_request_table;
mod m20240827_000004_create_friendship_table;
mod m20240827_000005_create_participation_request_table;
mod m20240827_000006_create_participant_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240827_000001_create_post_table::Migration),
            Box::new(m20240827_000002_create_user_block_table::Migration),
            Box::new(m20240827_000003_create_friend_request_table::Migration),
            Box::new(m20240827_000004_create_friendship_table::Migration),
            Box::new(m20240827_000005_create_participation_request_table::Migration),
            Box::new(m20240827_000006_create_participant_table::Migration),
        ]
    }
}
