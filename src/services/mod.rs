//! Service layer for business logic
//!
//! Core operations shared by the HTTP handlers. Every store or network call
//! made here is bounded by the caller's `Deadline`.

pub mod account_service;
pub mod analytics;
pub mod geoip;
pub mod key_registry;
pub mod url_service;

pub use account_service::{AccountService, LoginRequest, Session, SignupRequest};
pub use analytics::AnalyticsAggregator;
pub use geoip::{GeoInfo, GeoIpProvider, GeoLookup};
pub use key_registry::{AcceptedKey, KeyRegistry, RESERVED_KEYS, is_reserved};
pub use url_service::{CreateUrlRequest, UrlService, Visitor, VisitPolicy};
