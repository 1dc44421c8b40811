//! 短链接表迁移
//!
//! short_key 上的唯一约束是并发创建同名短链时唯一的正确性保证，
//! 应用层的存在性检查只用于提前拒绝

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShortUrls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortUrls::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortUrls::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(ShortUrls::Label).string().not_null())
                    .col(ColumnDef::new(ShortUrls::LongUrl).text().not_null())
                    .col(
                        ColumnDef::new(ShortUrls::ShortKey)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ShortUrls::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShortUrls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按用户列出短链接
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_urls_user_id")
                    .table(ShortUrls::Table)
                    .col(ShortUrls::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_urls_user_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortUrls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortUrls {
    #[sea_orm(iden = "short_urls")]
    Table,
    Id,
    UserId,
    Label,
    LongUrl,
    ShortKey,
    Clicks,
    CreatedAt,
}
