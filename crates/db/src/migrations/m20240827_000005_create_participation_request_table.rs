//! Create post participation request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostParticipationRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostParticipationRequest::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PostParticipationRequest::PostId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostParticipationRequest::RequesterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostParticipationRequest::AddresseeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PostParticipationRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_participation_request_post")
                            .from(
                                PostParticipationRequest::Table,
                                PostParticipationRequest::PostId,
                            )
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (post_id, requester_id) - one pending request per post
        manager
            .create_index(
                Index::create()
                    .name("idx_post_participation_request_post_requester")
                    .table(PostParticipationRequest::Table)
                    .col(PostParticipationRequest::PostId)
                    .col(PostParticipationRequest::RequesterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: addressee_id (owner's inbox)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_participation_request_addressee_id")
                    .table(PostParticipationRequest::Table)
                    .col(PostParticipationRequest::AddresseeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(PostParticipationRequest::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum PostParticipationRequest {
    Table,
    Id,
    PostId,
    RequesterId,
    AddresseeId,
    CreatedAt,
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
}
