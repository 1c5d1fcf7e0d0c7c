use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error("Unsupported browser: {0}")]
    UnsupportedBrowser(String),

    #[error("Navigation timeout after {0}s")]
    NavigationTimeout(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    #[error("General error: {0}")]
    General(String),
}

impl SmokeError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::LaunchFailed(_) => vec![
                "Ensure Chrome/Chromium is installed".into(),
                "Check if another Chrome instance is using the debugging port".into(),
                "Try specifying the executable with --chrome-path".into(),
            ],
            Self::UnsupportedBrowser(_) => vec![
                "Only chrome/chromium is supported".into(),
                "Drop the --browser flag to use the default".into(),
            ],
            Self::NavigationTimeout(timeout) => vec![
                format!("Increase timeout with --timeout {}", timeout + 30),
                "Check network connectivity".into(),
                "Verify the URL is accessible".into(),
            ],
            Self::InvalidUrl(_) => vec![
                "Ensure the URL includes a protocol (http:// or https://)".into(),
                "Check for typos in the URL".into(),
            ],
            Self::EvaluationError(_) => vec![
                "Check if the page finished loading".into(),
                "Run with --verbose to see detailed errors".into(),
            ],
            Self::ConfigError(_) => vec![
                "Check configuration file syntax".into(),
                "Use --config to specify a different config file".into(),
            ],
            _ => vec!["Run with --verbose for more details".into()],
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidUrl(_) => 2,
            Self::LaunchFailed(_) => 3,
            Self::NavigationTimeout(_) => 4,
            Self::EvaluationError(_) => 5,
            Self::IoError(_) => 6,
            Self::UnsupportedBrowser(_) | Self::ConfigError(_) | Self::TomlDeError(_) => 7,
            _ => 1,
        }
    }
}
