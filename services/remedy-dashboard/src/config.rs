//! Configuration types for the remedy dashboard

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::model::DEFAULT_SCAN_KINDS;

/// Environment variable overriding `api.base_url`
pub const API_BASE_URL_ENV: &str = "REMEDY_API_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Where the Remedy API lives and how to talk to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(default = "default_scan_kinds")]
    pub scan_kinds: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            scan_kinds: default_scan_kinds(),
        }
    }
}

/// Polling and toast timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub interval: Duration,
    #[serde(default = "default_toast_duration", with = "humantime_serde")]
    pub toast_duration: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: default_refresh_interval(),
            toast_duration: default_toast_duration(),
        }
    }
}

/// Dashboard web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
            history_size: default_history_size(),
        }
    }
}

/// Notifier configuration with tagged enum for extensibility
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    #[default]
    Bell,
    Silent,
}

impl Config {
    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            tracing::debug!("Using API base URL from {}", API_BASE_URL_ENV);
            self.api.base_url = base_url.trim().to_string();
        }
    }

    /// Reject settings the dashboard cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            crate::DashboardError::Config(format!(
                "Invalid API base URL '{}': {}",
                self.api.base_url, e
            ))
        })?;
        if self.refresh.interval.is_zero() {
            return Err(crate::DashboardError::Config(
                "Refresh interval must be greater than zero".to_string(),
            ));
        }
        if self.api.scan_kinds.is_empty() {
            return Err(crate::DashboardError::Config(
                "At least one scan kind is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_scan_kinds() -> Vec<String> {
    DEFAULT_SCAN_KINDS.iter().map(|k| k.to_string()).collect()
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_toast_duration() -> Duration {
    Duration::from_secs(6)
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    8090
}

fn default_history_size() -> usize {
    20
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
