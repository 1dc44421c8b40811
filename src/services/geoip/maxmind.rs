//! MaxMind GeoLite2 数据库实现

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use maxminddb::Reader;
use tracing::trace;

use super::provider::{GeoInfo, GeoLookup};

pub struct MaxMindProvider {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindProvider {
    pub fn new(path: &str) -> Result<Self, maxminddb::MaxMindDbError> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

#[async_trait]
impl GeoLookup for MaxMindProvider {
    async fn lookup(&self, ip: IpAddr) -> Option<GeoInfo> {
        let result = self.reader.lookup(ip).ok()?;
        let record: maxminddb::geoip2::City = result.decode().ok()??;

        let country = record
            .country
            .names
            .english
            .map(String::from)
            .or_else(|| record.country.iso_code.map(String::from));
        let city = record.city.names.english.map(String::from);

        trace!("MaxMind lookup for {}: country={:?}, city={:?}", ip, country, city);

        Some(GeoInfo { country, city })
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
