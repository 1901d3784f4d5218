//! Engine: refreshes dashboard state from the Remedy API and handles actions

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::model::{PullRequest, ScanQueued, Snapshot};
use crate::notifier::{AlertRecord, Notifier, PullRequestAlert};
use crate::state::{RefreshMode, RefreshOutcome, StateHandle};
use crate::DashboardError;

/// Timing and scan settings for a dashboard
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub refresh_interval: Duration,
    pub toast_duration: Duration,
    pub scan_kinds: Vec<String>,
}

/// One mounted dashboard: owns its state, its notifier, and its timers
pub struct Dashboard {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    state: StateHandle,
    settings: DashboardSettings,
    cancel: CancellationToken,
    toast_timer: Mutex<Option<CancellationToken>>,
}

impl Dashboard {
    pub fn new(
        api: Arc<ApiClient>,
        notifier: Arc<dyn Notifier>,
        state: StateHandle,
        settings: DashboardSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            api,
            notifier,
            state,
            settings,
            cancel,
            toast_timer: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Refresh once on mount, then in the background every interval.
    /// Returns when the cancellation token is triggered.
    pub async fn run(&self) {
        tracing::info!(
            "Polling {} every {:?}",
            self.api.base_url(),
            self.settings.refresh_interval
        );
        self.refresh(RefreshMode::Foreground).await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.settings.refresh_interval) => {
                    self.refresh(RefreshMode::Background).await;
                }
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Polling loop cancelled");
                    break;
                }
            }
        }
    }

    /// Unmount: stop polling and drop pending toast timers
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Fetch all four collections concurrently and apply them together
    pub async fn refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        let (sequence, filters) = {
            let mut state = self.state.write().await;
            let sequence = state.begin_refresh(mode);
            (sequence, state.filters.clone())
        };
        let repo_id = filters.repo_id.as_deref();
        let scan_id = filters.scan_id.as_deref();

        tracing::debug!(
            "Refresh #{} ({:?}) repo={:?} scan={:?}",
            sequence,
            mode,
            repo_id,
            scan_id
        );

        let fetched = tokio::try_join!(
            self.api.fetch_repos(),
            self.api.fetch_scans(repo_id),
            self.api.fetch_findings(repo_id, scan_id),
            self.api.fetch_pull_requests(repo_id),
        );

        let outcome = match fetched {
            Ok((repos, scans, findings, pull_requests)) => {
                let snapshot = Snapshot {
                    repos,
                    scans,
                    findings,
                    pull_requests,
                };
                self.state
                    .write()
                    .await
                    .apply_snapshot(sequence, snapshot, current_epoch_ms())
            }
            Err(e) => {
                tracing::warn!("Refresh #{} failed: {}", sequence, e);
                self.state
                    .write()
                    .await
                    .apply_failure(sequence, mode, e.to_string())
            }
        };

        match &outcome {
            RefreshOutcome::Stale => {
                tracing::debug!("Discarded stale refresh #{}", sequence);
            }
            RefreshOutcome::Applied {
                new_pull_request: Some(pr),
            } => {
                self.announce(pr).await;
            }
            _ => {}
        }

        outcome
    }

    /// Focus a repository (empty = all) and refresh immediately
    pub async fn select_repo(&self, repo_id: Option<String>) -> RefreshOutcome {
        let repo_id = repo_id.filter(|id| !id.is_empty());
        self.state.write().await.select_repo(repo_id);
        self.refresh(RefreshMode::Foreground).await
    }

    /// Focus a scan (empty = all) and refresh immediately
    pub async fn select_scan(&self, scan_id: Option<String>) -> RefreshOutcome {
        let scan_id = scan_id.filter(|id| !id.is_empty());
        self.state.write().await.select_scan(scan_id);
        self.refresh(RefreshMode::Foreground).await
    }

    /// Register a repository by URL, queue its first scan, and focus it
    pub async fn register_repo(&self, input: &str) -> crate::Result<ScanQueued> {
        let url = input.trim();
        if url.is_empty() {
            return Err(self
                .fail_action(DashboardError::Validation(
                    "Please provide a repository URL.".to_string(),
                ))
                .await);
        }

        {
            let mut state = self.state.write().await;
            state.action_message = None;
            state.registering = true;
        }

        let repo = match self.api.register_repo(url).await {
            Ok(repo) => repo,
            Err(e) => {
                self.state.write().await.registering = false;
                return Err(self.fail_action(e).await);
            }
        };
        tracing::info!("Registered repository '{}' ({})", repo.name, repo.id);
        {
            let mut state = self.state.write().await;
            state.action_message = Some(format!("Registered {}. Queuing scan…", repo.name));
            state.select_repo(Some(repo.id.clone()));
        }

        let queued = self
            .api
            .trigger_scan(&repo.id, &self.settings.scan_kinds)
            .await;
        self.state.write().await.registering = false;

        // The repository is focused now, so refresh scoped to it either way
        let result = match queued {
            Ok(queued) => {
                self.state.write().await.action_message = Some(format!(
                    "{} scan queued for {}.",
                    kinds_label(&self.settings.scan_kinds),
                    repo.name
                ));
                Ok(queued)
            }
            Err(e) => Err(self.fail_action(e).await),
        };
        self.refresh(RefreshMode::Background).await;
        result
    }

    /// Queue a scan for the focused repository
    pub async fn trigger_selected_scan(&self) -> crate::Result<ScanQueued> {
        let repo_id = {
            let mut state = self.state.write().await;
            match state.filters.repo_id.clone() {
                Some(id) => {
                    state.action_message = Some("Queueing scan…".to_string());
                    id
                }
                None => {
                    drop(state);
                    return Err(self
                        .fail_action(DashboardError::Validation(
                            "Select a repository to start a scan.".to_string(),
                        ))
                        .await);
                }
            }
        };

        match self
            .api
            .trigger_scan(&repo_id, &self.settings.scan_kinds)
            .await
        {
            Ok(queued) => {
                let jobs = queued.queued_jobs.len();
                tracing::info!("Queued {} scan job(s) for {}", jobs, repo_id);
                self.state.write().await.action_message = Some(format!(
                    "Scan queued ({} job{}).",
                    jobs,
                    if jobs == 1 { "" } else { "s" }
                ));
                self.refresh(RefreshMode::Background).await;
                Ok(queued)
            }
            Err(e) => Err(self.fail_action(e).await),
        }
    }

    /// Show an action error inline and hand it back to the caller
    async fn fail_action(&self, error: DashboardError) -> DashboardError {
        tracing::warn!("Dashboard action failed: {}", error);
        self.state.write().await.action_message = Some(error.to_string());
        error
    }

    /// Toast and notify for a newly opened pull request
    async fn announce(&self, pr: &PullRequest) {
        let message = format!("Remedy opened {}", pr.branch);
        tracing::info!("{}", message);

        let toast_id = self
            .state
            .write()
            .await
            .show_toast(message.clone(), pr.pr_url.clone());
        self.schedule_toast_clear(toast_id);

        let alert = PullRequestAlert {
            pull_request_id: pr.id.clone(),
            branch: pr.branch.clone(),
            url: pr.pr_url.clone(),
            message,
        };
        let result = self.notifier.notify(&alert).await;
        if let Err(e) = &result {
            tracing::warn!(
                "Notification via '{}' for {} failed: {}",
                self.notifier.type_name(),
                pr.branch,
                e
            );
        }

        self.state.write().await.add_alert(AlertRecord {
            pull_request_id: alert.pull_request_id,
            branch: alert.branch,
            url: alert.url,
            notifier_type: self.notifier.type_name().to_string(),
            success: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            timestamp_epoch_ms: current_epoch_ms(),
        });
    }

    /// Clear the toast after the configured lifetime unless superseded or unmounted
    fn schedule_toast_clear(&self, toast_id: u64) {
        let timer = self.cancel.child_token();
        let previous = self
            .toast_timer
            .lock()
            .map(|mut slot| slot.replace(timer.clone()))
            .unwrap_or_default();
        if let Some(previous) = previous {
            previous.cancel();
        }

        let state = Arc::clone(&self.state);
        let lifetime = self.settings.toast_duration;
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(lifetime) => {
                    state.write().await.clear_toast(toast_id);
                }
                _ = timer.cancelled() => {}
            }
        });
    }
}

/// `["sast", "sca"]` -> `"SAST + SCA"`
pub fn kinds_label(kinds: &[String]) -> String {
    kinds
        .iter()
        .map(|k| k.to_uppercase())
        .collect::<Vec<_>>()
        .join(" + ")
}

pub(crate) fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
