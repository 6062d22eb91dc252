use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Chats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Chats::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Chats::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(Chats::UserName).string().not_null())
                    .col(ColumnDef::new(Chats::Name).string().not_null())
                    .col(ColumnDef::new(Chats::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Chats::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chats_user_id")
                            .from(Chats::Table, Chats::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chats_user_updated")
                    .table(Chats::Table)
                    .col(Chats::UserId)
                    .col(Chats::UpdatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Chats {
    Table,
    Id,
    UserId,
    UserName,
    Name,
    CreatedAt,
    UpdatedAt,
}
