//! Create post participant table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostParticipant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostParticipant::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PostParticipant::PostId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostParticipant::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostParticipant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PostParticipant::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_participant_post")
                            .from(PostParticipant::Table, PostParticipant::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (post_id, user_id) - a user joins a post once
        manager
            .create_index(
                Index::create()
                    .name("idx_post_participant_post_user")
                    .table(PostParticipant::Table)
                    .col(PostParticipant::PostId)
                    .col(PostParticipant::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for a user's participations)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_participant_user_id")
                    .table(PostParticipant::Table)
                    .col(PostParticipant::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostParticipant::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PostParticipant {
    Table,
    Id,
    PostId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
