//! View model derived from dashboard state

use serde::Serialize;

use crate::model::{Finding, PullRequest, Repository, Scan};
use crate::notifier::AlertRecord;
use crate::state::{DashboardState, Toast};

/// Summary counts shown in the metric cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub repositories: usize,
    pub active_scans: usize,
    pub total_scans: usize,
    pub findings: usize,
    pub pull_requests: usize,
    pub open_pull_requests: usize,
}

/// Everything the page needs, computed from one read of the state
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub repos: Vec<Repository>,
    /// Scans scoped to the selected repository
    pub scans: Vec<Scan>,
    /// Findings scoped to the selected scan, if any
    pub findings: Vec<Finding>,
    pub pull_requests: Vec<PullRequest>,
    pub selected_repo_id: Option<String>,
    pub selected_repo_name: Option<String>,
    pub selected_scan_id: Option<String>,
    pub metrics: Metrics,
    pub loading: bool,
    pub error: Option<String>,
    pub action_message: Option<String>,
    pub registering: bool,
    pub last_refreshed_epoch_ms: Option<u64>,
    pub toast: Option<Toast>,
    /// Most recent first
    pub alerts: Vec<AlertRecord>,
}

impl ViewModel {
    pub fn from_state(state: &DashboardState) -> Self {
        let repo_id = state.filters.repo_id.as_deref();
        let scan_id = state.filters.scan_id.as_deref();
        let findings = visible_findings(&state.findings, scan_id);

        let metrics = Metrics {
            repositories: state.repos.len(),
            active_scans: active_scan_count(&state.scans),
            total_scans: state.scans.len(),
            findings: findings.len(),
            pull_requests: state.pull_requests.len(),
            open_pull_requests: open_pull_request_count(&state.pull_requests),
        };

        Self {
            repos: state.repos.clone(),
            scans: scans_for_repo(&state.scans, repo_id),
            findings,
            pull_requests: state.pull_requests.clone(),
            selected_repo_id: state.filters.repo_id.clone(),
            selected_repo_name: repo_id.and_then(|id| {
                state
                    .repos
                    .iter()
                    .find(|r| r.id == id)
                    .map(|r| r.name.clone())
            }),
            selected_scan_id: state.filters.scan_id.clone(),
            metrics,
            loading: state.loading,
            error: state.error.clone(),
            action_message: state.action_message.clone(),
            registering: state.registering,
            last_refreshed_epoch_ms: state.last_refreshed_epoch_ms,
            toast: state.toast.clone(),
            alerts: state.history.iter().rev().cloned().collect(),
        }
    }
}

/// Scans still queued or running
pub fn active_scan_count(scans: &[Scan]) -> usize {
    scans.iter().filter(|s| s.is_active()).count()
}

/// Pull requests not yet merged or closed
pub fn open_pull_request_count(pull_requests: &[PullRequest]) -> usize {
    pull_requests.iter().filter(|pr| pr.is_open()).count()
}

/// Findings of the selected scan, or all of them when no scan is selected
pub fn visible_findings(findings: &[Finding], scan_id: Option<&str>) -> Vec<Finding> {
    match scan_id {
        Some(id) => findings.iter().filter(|f| f.scan_id == id).cloned().collect(),
        None => findings.to_vec(),
    }
}

/// Scans of the selected repository, or all of them
pub fn scans_for_repo(scans: &[Scan], repo_id: Option<&str>) -> Vec<Scan> {
    match repo_id {
        Some(id) => scans.iter().filter(|s| s.repo_id == id).cloned().collect(),
        None => scans.to_vec(),
    }
}
