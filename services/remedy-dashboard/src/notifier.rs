//! Notifier trait for announcing new remediation pull requests

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::config::NotifierConfig;

/// A newly discovered pull request to announce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestAlert {
    pub pull_request_id: String,
    pub branch: String,
    pub url: Option<String>,
    pub message: String,
}

/// Record of an announced pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub pull_request_id: String,
    pub branch: String,
    pub url: Option<String>,
    pub notifier_type: String,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp_epoch_ms: u64,
}

/// Capability for the audible cue played when a new pull request shows up
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Get the notifier type name (e.g. "bell")
    fn type_name(&self) -> &str;

    /// Announce a pull request
    async fn notify(&self, alert: &PullRequestAlert) -> crate::Result<()>;
}

/// Rings the terminal bell on stderr
#[derive(Debug, Default)]
pub struct BellNotifier;

#[async_trait]
impl Notifier for BellNotifier {
    fn type_name(&self) -> &str {
        "bell"
    }

    async fn notify(&self, alert: &PullRequestAlert) -> crate::Result<()> {
        tracing::debug!("Ringing bell for {}", alert.branch);
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(b"\x07")
            .await
            .map_err(|e| crate::DashboardError::Notifier(format!("Writing bell: {}", e)))?;
        stderr
            .flush()
            .await
            .map_err(|e| crate::DashboardError::Notifier(format!("Flushing bell: {}", e)))?;
        Ok(())
    }
}

/// Does nothing; for headless deployments and tests
#[derive(Debug, Default)]
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    fn type_name(&self) -> &str {
        "silent"
    }

    async fn notify(&self, _alert: &PullRequestAlert) -> crate::Result<()> {
        Ok(())
    }
}

/// Build the notifier selected in the configuration
pub fn from_config(config: &NotifierConfig) -> std::sync::Arc<dyn Notifier> {
    match config {
        NotifierConfig::Bell => std::sync::Arc::new(BellNotifier),
        NotifierConfig::Silent => std::sync::Arc::new(SilentNotifier),
    }
}
