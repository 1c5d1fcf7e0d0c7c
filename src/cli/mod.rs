pub mod commands;
pub mod dispatch;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "landing-smoke")]
#[command(version, about = "Landing-page header/footer smoke test")]
#[command(
    long_about = "Browser-driven smoke test: opens a landing page, dismisses interstitial UI and verifies that the header and footer become visible"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<commands::Command>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "SMOKE_HEADLESS",
        help = "Run Chrome in headless mode"
    )]
    pub headless: Option<bool>,

    #[arg(long, global = true, help = "Chrome debugging port")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Path to Chrome executable")]
    pub chrome_path: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Readiness/visibility timeout in seconds"
    )]
    pub timeout: Option<u64>,
}

pub async fn run() -> crate::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        let content = std::fs::read_to_string(config_path)?;
        toml::from_str(&content)?
    } else {
        crate::config::Config::load()?
    };

    let overrides = crate::config::ConfigOverrides {
        headless: cli.headless,
        port: cli.port,
        chrome_path: cli.chrome_path.clone(),
        timeout: cli.timeout,
        json_pretty: None,
    };

    let config = Arc::new(config.with_overrides(overrides));
    config.validate()?;

    dispatch::dispatch(cli, config).await
}
