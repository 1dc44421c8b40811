use std::collections::BTreeMap;

use sea_orm::ActiveValue::Set;

use crate::storage::{ShortUrl, User};
use migration::entities::{short_url, url_device_stat, url_location_stat, user};

pub fn model_to_user(model: user::Model) -> User {
    User {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        created_at: model.created_at,
        refresh_token: model.refresh_token,
        refresh_token_issued_at: model.refresh_token_issued_at,
    }
}

pub fn user_to_active_model(user: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(user.id.clone()),
        full_name: Set(user.full_name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        created_at: Set(user.created_at),
        refresh_token: Set(user.refresh_token.clone()),
        refresh_token_issued_at: Set(user.refresh_token_issued_at),
    }
}

/// 新建短链接的行，计数从零开始
pub fn short_url_to_active_model(url: &ShortUrl) -> short_url::ActiveModel {
    short_url::ActiveModel {
        id: Set(url.url_id.clone()),
        user_id: Set(url.user_id.clone()),
        label: Set(url.label.clone()),
        long_url: Set(url.long_url.clone()),
        short_key: Set(url.short_url_key.clone()),
        clicks: Set(0),
        created_at: Set(url.created_at),
    }
}

/// 将短链接行与其访问桶合并为 ShortUrl
pub fn model_to_short_url(
    model: short_url::Model,
    devices: Vec<url_device_stat::Model>,
    locations: Vec<url_location_stat::Model>,
) -> ShortUrl {
    let device: BTreeMap<String, u64> = devices
        .into_iter()
        .map(|row| (row.device, row.hits.max(0) as u64))
        .collect();
    let location: BTreeMap<String, u64> = locations
        .into_iter()
        .map(|row| (row.location, row.hits.max(0) as u64))
        .collect();

    ShortUrl {
        url_id: model.id,
        user_id: model.user_id,
        label: model.label,
        long_url: model.long_url,
        short_url_key: model.short_key,
        no_of_clicks: model.clicks.max(0) as u64,
        device,
        location,
        created_at: model.created_at,
    }
}
