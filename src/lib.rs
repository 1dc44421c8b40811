//! linkpulse - URL shortener with per-user links, JWT sessions and click analytics
//!
//! # Architecture
//! - `storage`: `Store` trait, SeaORM and in-memory backends
//! - `services`: key allocation, click aggregation, accounts, geo-IP
//! - `auth`: JWT issuing, session lifecycle, access-token guard
//! - `api`: HTTP handlers and middleware
//! - `config`: Configuration loading
//! - `runtime`: Startup wiring, server mode and shutdown
//! - `system`: Logging setup

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
