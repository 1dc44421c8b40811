//! Read operations for SeaOrmStore

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use super::SeaOrmStore;
use super::converters::{model_to_short_url, model_to_user};
use crate::storage::{ShortUrl, StoreResult, User};

use migration::entities::{short_url, url_device_stat, url_location_stat, user};

impl SeaOrmStore {
    pub(super) async fn load_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_user))
    }

    pub(super) async fn load_user_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        let model = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_user))
    }

    pub(super) async fn count_users_with_email(&self, email: &str) -> StoreResult<u64> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?)
    }

    pub(super) async fn count_urls_with_key(&self, key: &str) -> StoreResult<u64> {
        Ok(short_url::Entity::find()
            .filter(short_url::Column::ShortKey.eq(key))
            .count(&self.db)
            .await?)
    }

    /// 按创建时间排序，访问桶批量加载
    pub(super) async fn load_urls_by_owner(&self, user_id: &str) -> StoreResult<Vec<ShortUrl>> {
        let models = short_url::Entity::find()
            .filter(short_url::Column::UserId.eq(user_id))
            .order_by_asc(short_url::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = models.iter().map(|m| m.short_key.clone()).collect();

        let mut devices: HashMap<String, Vec<url_device_stat::Model>> = HashMap::new();
        for row in url_device_stat::Entity::find()
            .filter(url_device_stat::Column::ShortKey.is_in(keys.clone()))
            .all(&self.db)
            .await?
        {
            devices.entry(row.short_key.clone()).or_default().push(row);
        }

        let mut locations: HashMap<String, Vec<url_location_stat::Model>> = HashMap::new();
        for row in url_location_stat::Entity::find()
            .filter(url_location_stat::Column::ShortKey.is_in(keys))
            .all(&self.db)
            .await?
        {
            locations.entry(row.short_key.clone()).or_default().push(row);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let d = devices.remove(&model.short_key).unwrap_or_default();
                let l = locations.remove(&model.short_key).unwrap_or_default();
                model_to_short_url(model, d, l)
            })
            .collect())
    }

    /// 读取单个短链接及其访问桶（可在事务内调用）
    pub(super) async fn load_url_with_buckets<C: ConnectionTrait>(
        conn: &C,
        key: &str,
    ) -> StoreResult<Option<ShortUrl>> {
        let Some(model) = short_url::Entity::find()
            .filter(short_url::Column::ShortKey.eq(key))
            .one(conn)
            .await?
        else {
            return Ok(None);
        };

        let devices = url_device_stat::Entity::find()
            .filter(url_device_stat::Column::ShortKey.eq(key))
            .all(conn)
            .await?;
        let locations = url_location_stat::Entity::find()
            .filter(url_location_stat::Column::ShortKey.eq(key))
            .all(conn)
            .await?;

        Ok(Some(model_to_short_url(model, devices, locations)))
    }
}
