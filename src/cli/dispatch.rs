use super::{
    Cli,
    commands::{Command, ConfigCommand},
};
use crate::{
    Result,
    browser::{BrowserKind, SessionRegistry, WorkerId},
    config::Config,
    output::{self, text},
    scenario::SmokeScenario,
    utils,
};
use std::sync::Arc;

pub async fn dispatch(mut cli: Cli, config: Arc<Config>) -> Result<()> {
    let command = match cli.command.take() {
        Some(cmd) => cmd,
        None => {
            eprintln!("No command provided. Use --help for usage.");
            std::process::exit(1);
        }
    };

    match command {
        Command::Run {
            url,
            browser,
            worker,
        } => run_scenario(&cli, config, url, &browser, &worker).await,
        Command::Config { command } => match command {
            ConfigCommand::Show => {
                println!("{}", config.show_masked());
                Ok(())
            }
        },
        Command::Doctor => doctor(&config),
    }
}

async fn run_scenario(
    cli: &Cli,
    config: Arc<Config>,
    url: Option<String>,
    browser: &str,
    worker: &str,
) -> Result<()> {
    let kind: BrowserKind = browser.parse()?;
    let base_url = url.unwrap_or_default();

    let registry = Arc::new(SessionRegistry::new(config.clone()));
    let scenario = SmokeScenario::new(registry, WorkerId::new(worker), config.clone());

    let report = scenario
        .run(kind, config.browser.headless, &base_url)
        .await?;

    output::print_output(&report, cli.json, config.output.json_pretty)?;

    if !report.passed {
        std::process::exit(1);
    }

    Ok(())
}

fn doctor(config: &Config) -> Result<()> {
    let chrome = match config.browser.chrome_path {
        Some(ref path) => Ok(path.clone()),
        None => utils::find_chrome_executable(),
    };

    match chrome {
        Ok(path) => println!("{}", text::key_value("Chrome", &path.display().to_string())),
        Err(e) => println!("{}", text::warning(&format!("Chrome not found: {}", e))),
    }

    match config.validate() {
        Ok(()) => println!("{}", text::success("Configuration is valid")),
        Err(e) => println!("{}", text::error(&format!("Configuration invalid: {}", e))),
    }

    Ok(())
}
