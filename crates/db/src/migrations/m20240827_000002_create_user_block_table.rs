//! Create user block table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserBlock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserBlock::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserBlock::BlockerId).big_integer().not_null())
                    .col(ColumnDef::new(UserBlock::BlockedId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserBlock::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (blocker_id, blocked_id) - prevent duplicate blocks
        manager
            .create_index(
                Index::create()
                    .name("idx_user_block_blocker_blocked")
                    .table(UserBlock::Table)
                    .col(UserBlock::BlockerId)
                    .col(UserBlock::BlockedId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: blocked_id (for the reverse-direction check)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_block_blocked_id")
                    .table(UserBlock::Table)
                    .col(UserBlock::BlockedId)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE user_block
                ADD CONSTRAINT chk_user_block_distinct CHECK (blocker_id <> blocked_id);
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBlock::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserBlock {
    Table,
    Id,
    BlockerId,
    BlockedId,
    CreatedAt,
}
