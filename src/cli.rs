//! Command-line interface definitions using clap

use clap::Parser;

/// linkpulse - URL shortener with click analytics
#[derive(Parser, Debug)]
#[command(name = "linkpulse")]
#[command(version)]
#[command(about = "A URL shortener with per-user links and click analytics", long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ./config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Print a sample config file to stdout and exit
    #[arg(long)]
    pub generate_config: bool,
}
