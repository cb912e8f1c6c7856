//! Create friendship table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Friendship::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Friendship::MemberA).big_integer().not_null())
                    .col(ColumnDef::new(Friendship::MemberB).big_integer().not_null())
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (member_a, member_b) - pairs are stored normalized
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_member_a_member_b")
                    .table(Friendship::Table)
                    .col(Friendship::MemberA)
                    .col(Friendship::MemberB)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: member_b (member_a is covered by the unique index)
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_member_b")
                    .table(Friendship::Table)
                    .col(Friendship::MemberB)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE friendship
                ADD CONSTRAINT chk_friendship_ordered CHECK (member_a < member_b);
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    Table,
    Id,
    MemberA,
    MemberB,
    CreatedAt,
}
