//! Server mode
//!
//! Builds the HTTP server around a prepared `StartupContext` and runs it
//! until the process receives Ctrl+C.

use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
};
use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::{AppConfig, CorsConfig};
use crate::runtime::shutdown;
use crate::runtime::startup::prepare_server_startup;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        error!(
            "allow_any_origin + allow_credentials lets any website make authenticated \
            cross-origin requests. Credentials are disabled."
        );
    }
}

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header("Content-Type")
        .allowed_header("Authorization")
        .allowed_header("Accept")
        .allowed_header(crate::api::constants::REFRESH_TOKEN_HEADER);

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    // Empty origins = same-origin only
    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors = cors.max_age(cors_config.max_age);

    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: AppConfig) -> Result<()> {
    let startup = prepare_server_startup(&config).await.map_err(|e| {
        error!("Server startup failed: {:#}", e);
        e
    })?;

    let store_for_shutdown = startup.store.clone();
    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let workers = match config.server.workers {
        0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
        n => n,
    }
    .min(32);
    info!("Using {} worker threads", workers);

    let server = HttpServer::new(move || {
        let startup = startup.clone();
        App::new()
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000")),
            )
            .configure(move |cfg| startup.configure(cfg))
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .workers(workers)
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();
    let handle = server.handle();

    let result = tokio::select! {
        res = server => res,
        _ = shutdown::wait_for_signal() => {
            handle.stop(true).await;
            warn!("HTTP server stopped");
            Ok(())
        }
    };

    shutdown::close_store(store_for_shutdown).await;
    result.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_cors_allows_configured_origin() {
        let cors_config = CorsConfig {
            enabled: true,
            allowed_origins: vec!["https://app.example".to_string()],
            allow_credentials: true,
            max_age: 600,
        };
        let app = test::init_service(
            App::new()
                .wrap(build_cors_middleware(&cors_config))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("https://app.example")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }

    #[actix_web::test]
    async fn test_any_origin_drops_credentials() {
        let cors_config = CorsConfig {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 600,
        };
        let app = test::init_service(
            App::new()
                .wrap(build_cors_middleware(&cors_config))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://elsewhere.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .is_none()
        );
    }
}
