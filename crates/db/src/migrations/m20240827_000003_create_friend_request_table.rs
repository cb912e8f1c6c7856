//! Create friend request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::RequesterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::AddresseeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index over the unordered pair: one pending request per pair,
        // whichever direction it was sent in
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_friend_request_pair
                ON friend_request (
                    LEAST(requester_id, addressee_id),
                    GREATEST(requester_id, addressee_id)
                );
                ",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE friend_request
                ADD CONSTRAINT chk_friend_request_distinct CHECK (requester_id <> addressee_id);
                ",
            )
            .await?;

        // Index: addressee_id (for received requests)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_addressee_id")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::AddresseeId)
                    .to_owned(),
            )
            .await?;

        // Index: requester_id (for sent requests)
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_requester_id")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::RequesterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FriendRequest {
    Table,
    Id,
    RequesterId,
    AddresseeId,
    CreatedAt,
}
