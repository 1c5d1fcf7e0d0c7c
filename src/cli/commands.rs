use clap::Subcommand;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Run the landing-page smoke scenario")]
    Run {
        #[arg(
            env = "SMOKE_BASE_URL",
            help = "Base URL to open (blank uses the configured default)"
        )]
        url: Option<String>,

        #[arg(
            long,
            env = "SMOKE_BROWSER",
            default_value = "chrome",
            help = "Browser kind (only chrome/chromium is supported)"
        )]
        browser: String,

        #[arg(
            long,
            default_value = "main",
            help = "Worker label owning the browser session"
        )]
        worker: String,
    },

    #[command(about = "Inspect configuration")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    #[command(about = "Check Chrome availability and configuration")]
    Doctor,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,
}
