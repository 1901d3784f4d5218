//! Dashboard state: mirrored collections, filters, and refresh bookkeeping

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::model::{Finding, PullRequest, Repository, Scan, Snapshot};
use crate::notifier::AlertRecord;

/// How a refresh reacts to failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Initial or user-initiated: shows the loading banner, clears data on failure
    Foreground,
    /// Timer-driven or follow-up: keeps the last good data on failure
    Background,
}

/// Current filter selection; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub repo_id: Option<String>,
    pub scan_id: Option<String>,
}

/// Transient notice about a newly opened pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub url: Option<String>,
}

/// What happened to a refresh result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot replaced the collections
    Applied {
        new_pull_request: Option<PullRequest>,
    },
    /// The refresh failed and the error banner was updated
    Failed { message: String },
    /// A newer refresh was issued meanwhile; the result was dropped
    Stale,
}

/// State owned by one mounted dashboard
#[derive(Debug)]
pub struct DashboardState {
    pub repos: Vec<Repository>,
    pub scans: Vec<Scan>,
    pub findings: Vec<Finding>,
    pub pull_requests: Vec<PullRequest>,
    pub filters: Filters,
    pub loading: bool,
    pub error: Option<String>,
    pub last_refreshed_epoch_ms: Option<u64>,
    pub action_message: Option<String>,
    pub registering: bool,
    pub toast: Option<Toast>,
    pub history: VecDeque<AlertRecord>,
    pub history_max_size: usize,
    seen_pull_request_ids: HashSet<String>,
    bootstrapped: bool,
    issued_sequence: u64,
    next_toast_id: u64,
}

impl DashboardState {
    pub fn new(history_max_size: usize) -> Self {
        Self {
            repos: Vec::new(),
            scans: Vec::new(),
            findings: Vec::new(),
            pull_requests: Vec::new(),
            filters: Filters::default(),
            loading: false,
            error: None,
            last_refreshed_epoch_ms: None,
            action_message: None,
            registering: false,
            toast: None,
            history: VecDeque::with_capacity(history_max_size),
            history_max_size,
            seen_pull_request_ids: HashSet::new(),
            bootstrapped: false,
            issued_sequence: 0,
            next_toast_id: 0,
        }
    }

    /// Issue a new refresh and return its sequence number.
    ///
    /// Only the most recently issued refresh may write its result.
    pub fn begin_refresh(&mut self, mode: RefreshMode) -> u64 {
        self.issued_sequence += 1;
        if mode == RefreshMode::Foreground {
            self.loading = true;
        }
        self.issued_sequence
    }

    pub fn latest_sequence(&self) -> u64 {
        self.issued_sequence
    }

    /// Whether the first snapshot has been applied
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Replace all four collections with a snapshot.
    ///
    /// Reports the first pull request not seen by the previous snapshot,
    /// except on the first successful load.
    pub fn apply_snapshot(&mut self, sequence: u64, snapshot: Snapshot, now_ms: u64) -> RefreshOutcome {
        if sequence != self.issued_sequence {
            return RefreshOutcome::Stale;
        }

        let Snapshot {
            repos,
            scans,
            findings,
            pull_requests,
        } = snapshot;

        let newly_seen = pull_requests
            .iter()
            .find(|pr| !self.seen_pull_request_ids.contains(&pr.id))
            .cloned();
        self.seen_pull_request_ids = pull_requests.iter().map(|pr| pr.id.clone()).collect();

        self.repos = repos;
        self.scans = scans;
        self.findings = findings;
        self.pull_requests = pull_requests;
        self.error = None;
        self.loading = false;
        self.last_refreshed_epoch_ms = Some(now_ms);

        let new_pull_request = if self.bootstrapped { newly_seen } else { None };
        self.bootstrapped = true;

        RefreshOutcome::Applied { new_pull_request }
    }

    /// Record a failed refresh. Foreground failures clear the collections.
    pub fn apply_failure(&mut self, sequence: u64, mode: RefreshMode, message: String) -> RefreshOutcome {
        if sequence != self.issued_sequence {
            return RefreshOutcome::Stale;
        }

        if mode == RefreshMode::Foreground {
            self.repos.clear();
            self.scans.clear();
            self.findings.clear();
            self.pull_requests.clear();
        }
        self.loading = false;
        self.error = Some(message.clone());

        RefreshOutcome::Failed { message }
    }

    /// Focus a repository; the scan filter always resets to "all"
    pub fn select_repo(&mut self, repo_id: Option<String>) {
        self.filters.repo_id = repo_id;
        self.filters.scan_id = None;
    }

    pub fn select_scan(&mut self, scan_id: Option<String>) {
        self.filters.scan_id = scan_id;
    }

    /// Show a toast, replacing any current one, and return its id
    pub fn show_toast(&mut self, message: String, url: Option<String>) -> u64 {
        self.next_toast_id += 1;
        self.toast = Some(Toast {
            id: self.next_toast_id,
            message,
            url,
        });
        self.next_toast_id
    }

    /// Clear the toast if it is still the one with `id`
    pub fn clear_toast(&mut self, id: u64) -> bool {
        if self.toast.as_ref().is_some_and(|t| t.id == id) {
            self.toast = None;
            true
        } else {
            false
        }
    }

    /// Add an alert to history
    pub fn add_alert(&mut self, record: AlertRecord) {
        if self.history_max_size == 0 {
            return;
        }
        if self.history.len() >= self.history_max_size {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<DashboardState>>;

pub fn new_state_handle(history_max_size: usize) -> StateHandle {
    Arc::new(RwLock::new(DashboardState::new(history_max_size)))
}
