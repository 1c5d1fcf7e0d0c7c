use crate::{Result, SmokeError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    pub chrome_path: Option<PathBuf>,
    #[serde(default)]
    pub headless: bool,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

/// Target site and the selector set probed by the page model.
///
/// Defaults are tuned for <https://inseego.com>: a OneTrust cookie
/// banner and a `div.dialogContents` promo overlay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_header_selector")]
    pub header_selector: String,
    #[serde(default = "default_footer_selector")]
    pub footer_selector: String,
    #[serde(default = "default_cookie_accept_selector")]
    pub cookie_accept_selector: String,
    #[serde(default = "default_promo_container_selector")]
    pub promo_container_selector: String,
    #[serde(default = "default_promo_close_selector")]
    pub promo_close_selector: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollConfig {
    #[serde(default = "default_scroll_steps")]
    pub steps: u32,
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "default_min_chunk_px")]
    pub min_chunk_px: u32,
    #[serde(default = "default_chunk_ratio")]
    pub chunk_ratio: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaitConfig {
    #[serde(default = "default_visibility_timeout")]
    pub visibility_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub json_pretty: bool,
}

fn default_port() -> u16 {
    9222
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_base_url() -> String {
    "https://inseego.com".to_string()
}
fn default_header_selector() -> String {
    "header, [role='banner']".to_string()
}
fn default_footer_selector() -> String {
    "footer, .MainSiteFooter".to_string()
}
fn default_cookie_accept_selector() -> String {
    "#onetrust-accept-btn-handler".to_string()
}
fn default_promo_container_selector() -> String {
    "div.dialogContents".to_string()
}
fn default_promo_close_selector() -> String {
    concat!(
        "div.dialogContents button[aria-label*='close' i], ",
        "div.dialogContents [role='button'][aria-label*='close' i], ",
        "div.dialogContents button.close, ",
        "div.dialogContents .close"
    )
    .to_string()
}
fn default_scroll_steps() -> u32 {
    22
}
fn default_step_delay_ms() -> u64 {
    250
}
fn default_min_chunk_px() -> u32 {
    200
}
fn default_chunk_ratio() -> f64 {
    0.30
}
fn default_visibility_timeout() -> u64 {
    crate::timeouts::secs::VISIBILITY
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: false,
            port: default_port(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            header_selector: default_header_selector(),
            footer_selector: default_footer_selector(),
            cookie_accept_selector: default_cookie_accept_selector(),
            promo_container_selector: default_promo_container_selector(),
            promo_close_selector: default_promo_close_selector(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            steps: default_scroll_steps(),
            step_delay_ms: default_step_delay_ms(),
            min_chunk_px: default_min_chunk_px(),
            chunk_ratio: default_chunk_ratio(),
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_secs: default_visibility_timeout(),
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    default_config_dir().map(|p| p.join("config.toml"))
}

pub fn default_config_dir() -> Result<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })
        .map(|p| p.join("landing-smoke"))
        .ok_or_else(|| SmokeError::ConfigError("Could not determine config directory".into()))
}

impl Config {
    /// Global config file, then a project-local `.landing-smoke.toml`
    /// (which wins wholesale), then environment variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        let global_path = default_config_path()?;
        if global_path.exists() {
            let content = std::fs::read_to_string(&global_path)?;
            config = toml::from_str(&content)?;
        }

        let project_path = PathBuf::from(".landing-smoke.toml");
        if project_path.exists() {
            let content = std::fs::read_to_string(&project_path)?;
            config = toml::from_str(&content)?;
        }

        config.load_from_env();

        Ok(config)
    }

    pub fn with_overrides(&self, cli_overrides: ConfigOverrides) -> Self {
        let mut config = self.clone();

        if let Some(headless) = cli_overrides.headless {
            config.browser.headless = headless;
        }
        if let Some(port) = cli_overrides.port {
            config.browser.port = port;
        }
        if let Some(chrome_path) = cli_overrides.chrome_path {
            config.browser.chrome_path = Some(chrome_path);
        }
        if let Some(timeout) = cli_overrides.timeout {
            config.wait.visibility_timeout_secs = timeout;
        }
        if let Some(json_pretty) = cli_overrides.json_pretty {
            config.output.json_pretty = json_pretty;
        }

        config
    }

    fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("SMOKE_BASE_URL")
            && !url.trim().is_empty()
        {
            self.site.base_url = url;
        }
        if let Ok(headless) = std::env::var("SMOKE_HEADLESS") {
            self.browser.headless = headless == "true" || headless == "1";
        }
        if let Ok(path) = std::env::var("SMOKE_CHROME_PATH") {
            self.browser.chrome_path = Some(PathBuf::from(path));
        }
        if let Ok(timeout) = std::env::var("SMOKE_TIMEOUT")
            && let Ok(timeout) = timeout.parse()
        {
            self.wait.visibility_timeout_secs = timeout;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.browser.port < 1024 {
            return Err(SmokeError::ConfigError(format!(
                "port {} is out of valid range (1024-65535)",
                self.browser.port
            )));
        }

        if self.wait.visibility_timeout_secs == 0 {
            return Err(SmokeError::ConfigError(
                "visibility_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.scroll.steps == 0 {
            return Err(SmokeError::ConfigError(
                "scroll steps must be greater than 0".into(),
            ));
        }

        if self.scroll.chunk_ratio <= 0.0 || self.scroll.chunk_ratio > 1.0 {
            return Err(SmokeError::ConfigError(
                "scroll chunk_ratio must be in (0, 1]".into(),
            ));
        }

        if self.site.base_url.trim().is_empty() {
            return Err(SmokeError::ConfigError("base_url must not be blank".into()));
        }

        if let Some(ref path) = self.browser.chrome_path
            && !path.exists()
        {
            return Err(SmokeError::ConfigError(format!(
                "Chrome path does not exist: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn show_masked(&self) -> String {
        format!(
            r#"Browser:
  Chrome Path: {}
  Headless: {}
  Port: {}
  Window: {}x{}

Site:
  Base URL: {}
  Header: {}
  Footer: {}
  Cookie Accept: {}
  Promo Container: {}

Scroll:
  Steps: {}
  Step Delay: {}ms
  Chunk: max({}px, {:.0}% of viewport)

Wait:
  Visibility Timeout: {}s
"#,
            self.browser
                .chrome_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "auto-detect".into()),
            self.browser.headless,
            self.browser.port,
            self.browser.window_width,
            self.browser.window_height,
            self.site.base_url,
            self.site.header_selector,
            self.site.footer_selector,
            self.site.cookie_accept_selector,
            self.site.promo_container_selector,
            self.scroll.steps,
            self.scroll.step_delay_ms,
            self.scroll.min_chunk_px,
            self.scroll.chunk_ratio * 100.0,
            self.wait.visibility_timeout_secs,
        )
    }
}

#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub headless: Option<bool>,
    pub port: Option<u16>,
    pub chrome_path: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub json_pretty: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.browser.headless);
        assert_eq!(config.browser.port, 9222);
        assert_eq!(config.site.base_url, "https://inseego.com");
        assert_eq!(config.scroll.steps, 22);
        assert_eq!(config.scroll.step_delay_ms, 250);
        assert_eq!(config.wait.visibility_timeout_secs, 12);
    }

    #[test]
    fn test_site_config_default_selectors() {
        let site = SiteConfig::default();
        assert_eq!(site.header_selector, "header, [role='banner']");
        assert_eq!(site.footer_selector, "footer, .MainSiteFooter");
        assert_eq!(site.cookie_accept_selector, "#onetrust-accept-btn-handler");
        assert!(site.promo_close_selector.contains("aria-label*='close' i"));
    }

    #[test]
    fn test_config_validate_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_invalid_port() {
        let mut config = Config::default();
        config.browser.port = 80;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_invalid_timeout() {
        let mut config = Config::default();
        config.wait.visibility_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_invalid_scroll() {
        let mut config = Config::default();
        config.scroll.steps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scroll.chunk_ratio = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_missing_chrome_path() {
        let mut config = Config::default();
        config.browser.chrome_path = Some(PathBuf::from("/nonexistent/chrome"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_with_overrides() {
        let config = Config::default();
        let overrides = ConfigOverrides {
            headless: Some(true),
            port: Some(9333),
            chrome_path: None,
            timeout: Some(60),
            json_pretty: Some(true),
        };

        let result = config.with_overrides(overrides);
        assert!(result.browser.headless);
        assert_eq!(result.browser.port, 9333);
        assert_eq!(result.wait.visibility_timeout_secs, 60);
        assert!(result.output.json_pretty);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[browser]"));
        assert!(toml_str.contains("[site]"));
        assert!(toml_str.contains("[scroll]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.browser.port, config.browser.port);
        assert_eq!(parsed.site.base_url, config.site.base_url);
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[site]\nbase_url = \"https://example.com\"\n").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.site.base_url, "https://example.com");
        assert_eq!(parsed.site.header_selector, "header, [role='banner']");
        assert_eq!(parsed.scroll.steps, 22);
    }
}
