//! Write operations for SeaOrmStore

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, TransactionTrait,
};
use tracing::{debug, info};

use super::SeaOrmStore;
use super::converters::{short_url_to_active_model, user_to_active_model};
use crate::storage::{ShortUrl, StoreError, StoreResult, User};

use migration::entities::{short_url, url_device_stat, url_location_stat, user};

impl SeaOrmStore {
    pub(super) async fn insert_user_row(&self, user: &User) -> StoreResult<()> {
        user::Entity::insert(user_to_active_model(user))
            .exec_without_returning(&self.db)
            .await?;
        info!("User created: {}", user.id);
        Ok(())
    }

    pub(super) async fn set_refresh_token(
        &self,
        user_id: &str,
        token: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result = user::Entity::update_many()
            .col_expr(
                user::Column::RefreshToken,
                Expr::value(token.map(str::to_string)),
            )
            .col_expr(user::Column::RefreshTokenIssuedAt, Expr::value(issued_at))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }

    /// 唯一约束冲突由 `From<DbErr>` 映射为 `StoreError::Duplicate`
    pub(super) async fn insert_url_row(&self, url: &ShortUrl) -> StoreResult<()> {
        short_url::Entity::insert(short_url_to_active_model(url))
            .exec_without_returning(&self.db)
            .await?;
        info!("Short URL created: {} -> {}", url.short_url_key, url.long_url);
        Ok(())
    }

    /// 一次事务内完成 clicks 与两个访问桶的自增，全部在数据库侧计算
    pub(super) async fn record_hit(
        &self,
        key: &str,
        device: &str,
        location: &str,
    ) -> StoreResult<Option<ShortUrl>> {
        let txn = self.db.begin().await?;

        let updated = short_url::Entity::update_many()
            .col_expr(
                short_url::Column::Clicks,
                Expr::col(short_url::Column::Clicks).add(1),
            )
            .filter(short_url::Column::ShortKey.eq(key))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        url_device_stat::Entity::insert(url_device_stat::ActiveModel {
            short_key: Set(key.to_string()),
            device: Set(device.to_string()),
            hits: Set(1),
        })
        .on_conflict(
            OnConflict::columns([
                url_device_stat::Column::ShortKey,
                url_device_stat::Column::Device,
            ])
            .value(
                url_device_stat::Column::Hits,
                Expr::col((url_device_stat::Entity, url_device_stat::Column::Hits)).add(1),
            )
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        url_location_stat::Entity::insert(url_location_stat::ActiveModel {
            short_key: Set(key.to_string()),
            location: Set(location.to_string()),
            hits: Set(1),
        })
        .on_conflict(
            OnConflict::columns([
                url_location_stat::Column::ShortKey,
                url_location_stat::Column::Location,
            ])
            .value(
                url_location_stat::Column::Hits,
                Expr::col((url_location_stat::Entity, url_location_stat::Column::Hits)).add(1),
            )
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let url = Self::load_url_with_buckets(&txn, key).await?;
        txn.commit().await?;

        debug!("Visit recorded for {} ({}, {})", key, device, location);
        Ok(url)
    }
}
