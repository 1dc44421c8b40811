//! 访问分桶表迁移
//!
//! url_device_stats / url_location_stats 以 (short_key, label) 为复合主键，
//! 每次访问通过 upsert 在数据库侧自增 hits

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UrlDeviceStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlDeviceStats::ShortKey)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlDeviceStats::Device)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlDeviceStats::Hits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(UrlDeviceStats::ShortKey)
                            .col(UrlDeviceStats::Device),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UrlLocationStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UrlLocationStats::ShortKey)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlLocationStats::Location)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UrlLocationStats::Hits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(UrlLocationStats::ShortKey)
                            .col(UrlLocationStats::Location),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UrlLocationStats::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UrlDeviceStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UrlDeviceStats {
    #[sea_orm(iden = "url_device_stats")]
    Table,
    ShortKey,
    Device,
    Hits,
}

#[derive(DeriveIden)]
enum UrlLocationStats {
    #[sea_orm(iden = "url_location_stats")]
    Table,
    ShortKey,
    Location,
    Hits,
}
