use clap::Parser;
use tracing::{error, info};

use linkpulse::cli::Cli;
use linkpulse::config::AppConfig;
use linkpulse::runtime::run_server;
use linkpulse::storage::infer_backend_from_url;
use linkpulse::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", AppConfig::generate_sample_config());
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;

    // guard 必须存活到进程结束，否则文件日志会丢失
    let _log_guard = init_logging(&config.logging)?;
    config.auth.fill_missing_secrets();
    info!(
        "linkpulse v{} starting (storage: {})",
        env!("CARGO_PKG_VERSION"),
        infer_backend_from_url(&config.database.database_url).unwrap_or("unknown")
    );

    if let Err(e) = run_server(config).await {
        error!("Server exited with error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
