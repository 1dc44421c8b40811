pub mod short_url;
pub mod url_device_stat;
pub mod url_location_stat;
pub mod user;

pub use short_url::Entity as ShortUrlEntity;
pub use url_device_stat::Entity as UrlDeviceStatEntity;
pub use url_location_stat::Entity as UrlLocationStatEntity;
pub use user::Entity as UserEntity;
