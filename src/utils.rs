use crate::{Result, SmokeError};
use std::path::PathBuf;
use url::Url;

/// Resolve a usable base URL from caller input.
///
/// Blank input falls back to the configured default; a schemeless host
/// gets `https://` prefixed. The result must parse as an absolute URL.
pub fn normalize_base_url(input: &str, fallback: &str) -> Result<String> {
    let trimmed = input.trim();
    let raw = if trimmed.is_empty() {
        fallback.trim()
    } else {
        trimmed
    };

    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    Url::parse(&candidate).map_err(|e| SmokeError::InvalidUrl(format!("{}: {}", candidate, e)))?;

    Ok(candidate)
}

pub fn find_chrome_executable() -> Result<PathBuf> {
    if let Some(path) = find_in_standard_locations() {
        return Ok(path);
    }

    if let Some(path) = find_in_path() {
        return Ok(path);
    }

    Err(SmokeError::LaunchFailed(
        "Could not find Chrome/Chromium executable. Please specify with --chrome-path".into(),
    ))
}

#[cfg(target_os = "macos")]
fn find_in_standard_locations() -> Option<PathBuf> {
    let paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
    ];

    paths.iter().map(PathBuf::from).find(|p| p.exists())
}

#[cfg(target_os = "linux")]
fn find_in_standard_locations() -> Option<PathBuf> {
    let paths = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
    ];

    paths.iter().map(PathBuf::from).find(|p| p.exists())
}

#[cfg(target_os = "windows")]
fn find_in_standard_locations() -> Option<PathBuf> {
    let paths = [
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files\Chromium\Application\chrome.exe",
    ];

    if let Some(found) = paths.iter().map(PathBuf::from).find(|p| p.exists()) {
        return Some(found);
    }

    if let Ok(local_app_data) = std::env::var("LOCALAPPDATA") {
        let user_chrome = PathBuf::from(&local_app_data)
            .join("Google")
            .join("Chrome")
            .join("Application")
            .join("chrome.exe");
        if user_chrome.exists() {
            return Some(user_chrome);
        }
    }

    None
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn find_in_standard_locations() -> Option<PathBuf> {
    None
}

fn find_in_path() -> Option<PathBuf> {
    let binaries = if cfg!(windows) {
        vec!["chrome.exe", "chromium.exe"]
    } else {
        vec!["google-chrome", "chromium", "chromium-browser", "chrome"]
    };

    for binary in binaries {
        if let Ok(path) = which::which(binary) {
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = "https://inseego.com";

    #[test]
    fn blank_input_uses_fallback() {
        assert_eq!(normalize_base_url("", FALLBACK).unwrap(), FALLBACK);
        assert_eq!(normalize_base_url("   ", FALLBACK).unwrap(), FALLBACK);
    }

    #[test]
    fn schemeless_input_gets_https_prefix() {
        assert_eq!(
            normalize_base_url("example.com", FALLBACK).unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn scheme_carrying_input_passes_through() {
        assert_eq!(
            normalize_base_url("http://example.com", FALLBACK).unwrap(),
            "http://example.com"
        );
        assert_eq!(
            normalize_base_url("https://example.com/path", FALLBACK).unwrap(),
            "https://example.com/path"
        );
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(
            normalize_base_url("  example.com  ", FALLBACK).unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn unparseable_url_is_rejected() {
        let err = normalize_base_url("http://", FALLBACK).unwrap_err();
        assert!(matches!(err, SmokeError::InvalidUrl(_)));
    }
}
