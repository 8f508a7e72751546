//! Configuration management
//!
//! Settings live in `settings.json` inside the fintrack directory:
//! ```json
//! {
//!   "serverUrl": "http://localhost:8000/api/v1",
//!   "signInPath": "/signin",
//!   "sessionCookie": "connect.sid=...",
//!   "requestTimeoutSecs": 10,
//!   "fetchMode": "coalesce",
//!   "demoMode": false
//! }
//! ```
//! Keys this crate does not know about are kept when saving.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::services::FetchMode;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_SIGN_IN_PATH: &str = "/signin";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sign_in_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    fetch_mode: FetchMode,
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Fintrack configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub sign_in_path: String,
    pub session_cookie: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub fetch_mode: FetchMode,
    pub demo_mode: bool,
    // Raw settings, so unmanaged keys survive a save
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default())
    }
}

impl Config {
    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            server_url: raw
                .server_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            sign_in_path: raw
                .sign_in_path
                .clone()
                .unwrap_or_else(|| DEFAULT_SIGN_IN_PATH.to_string()),
            session_cookie: raw.session_cookie.clone(),
            request_timeout_secs: raw.request_timeout_secs,
            fetch_mode: raw.fetch_mode,
            demo_mode: raw.demo_mode,
            raw_settings: raw,
        }
    }

    /// Load config from the fintrack directory
    ///
    /// Environment overrides (for CI and scripting):
    /// `FINTRACK_SERVER_URL`, `FINTRACK_SESSION_COOKIE`, `FINTRACK_DEMO_MODE`.
    pub fn load(fintrack_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(fintrack_dir)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load only what is on disk, ignoring the environment
    pub fn load_file(fintrack_dir: &Path) -> Result<Self> {
        Ok(Self::from_settings(read_settings(fintrack_dir)?))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FINTRACK_SERVER_URL").filter(|v| !v.trim().is_empty()) {
            self.server_url = url;
        }
        if let Some(cookie) = lookup("FINTRACK_SESSION_COOKIE").filter(|v| !v.trim().is_empty()) {
            self.session_cookie = Some(cookie);
        }
        match lookup("FINTRACK_DEMO_MODE").as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => self.demo_mode = true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => self.demo_mode = false,
            _ => {}
        }
    }

    /// Save config to the fintrack directory
    ///
    /// Re-reads the file first so keys written by other tools are preserved.
    pub fn save(&self, fintrack_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(fintrack_dir).with_context(|| {
            format!("Failed to create directory {}", fintrack_dir.display())
        })?;

        let mut settings = read_settings(fintrack_dir).unwrap_or_else(|_| self.raw_settings.clone());
        settings.server_url = Some(self.server_url.clone());
        settings.sign_in_path = Some(self.sign_in_path.clone());
        settings.session_cookie = self.session_cookie.clone();
        settings.request_timeout_secs = self.request_timeout_secs;
        settings.fetch_mode = self.fetch_mode;
        settings.demo_mode = self.demo_mode;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(fintrack_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    pub fn set_session_cookie(&mut self, cookie: impl Into<String>) {
        let cookie = cookie.into();
        self.session_cookie = (!cookie.trim().is_empty()).then_some(cookie);
    }

    pub fn clear_session_cookie(&mut self) {
        self.session_cookie = None;
    }
}

fn read_settings(fintrack_dir: &Path) -> Result<SettingsFile> {
    let settings_path = fintrack_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid settings in {}", settings_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_file(dir.path()).unwrap();

        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.sign_in_path, "/signin");
        assert_eq!(config.fetch_mode, FetchMode::Coalesce);
        assert!(!config.demo_mode);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_reads_camel_case_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{
                "serverUrl": "https://api.fintrack.test/api/v1",
                "sessionCookie": "connect.sid=abc",
                "requestTimeoutSecs": 5,
                "fetchMode": "independent",
                "demoMode": true
            }"#,
        )
        .unwrap();

        let config = Config::load_file(dir.path()).unwrap();
        assert_eq!(config.server_url, "https://api.fintrack.test/api/v1");
        assert_eq!(config.session_cookie.as_deref(), Some("connect.sid=abc"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.fetch_mode, FetchMode::Independent);
        assert!(config.demo_mode);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert!(Config::load_file(dir.path()).is_err());
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "theme": "dark", "demoMode": false }"#,
        )
        .unwrap();

        let mut config = Config::load_file(dir.path()).unwrap();
        config.enable_demo_mode();
        config.set_session_cookie("connect.sid=xyz");
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["demoMode"], true);
        assert_eq!(value["sessionCookie"], "connect.sid=xyz");

        let reloaded = Config::load_file(dir.path()).unwrap();
        assert!(reloaded.demo_mode);
    }

    #[test]
    fn test_clearing_cookie_removes_key() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set_session_cookie("connect.sid=xyz");
        config.save(dir.path()).unwrap();

        config.clear_session_cookie();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        assert!(!content.contains("sessionCookie"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "FINTRACK_SERVER_URL" => Some("http://127.0.0.1:9000/api/v1".into()),
            "FINTRACK_DEMO_MODE" => Some("1".into()),
            "FINTRACK_SESSION_COOKIE" => Some("  ".into()),
            _ => None,
        });

        assert_eq!(config.server_url, "http://127.0.0.1:9000/api/v1");
        assert!(config.demo_mode);
        assert!(config.session_cookie.is_none());

        config.apply_overrides(|key| (key == "FINTRACK_DEMO_MODE").then(|| "no".to_string()));
        assert!(!config.demo_mode);
    }
}
