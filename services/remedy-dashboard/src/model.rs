//! Records mirrored from the Remedy API

use serde::{Deserialize, Serialize};

/// Scan kinds queued when the caller does not choose any
pub const DEFAULT_SCAN_KINDS: [&str; 2] = ["sast", "sca"];

/// A source repository registered for scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    pub created_at: String,
}

/// One execution of a security analysis against a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,
    pub repo_id: String,
    pub kind: String,
    pub status: String,
    pub created_at: String,
}

impl Scan {
    /// Anything that has not reached `completed` or `failed` is still active
    pub fn is_active(&self) -> bool {
        self.status != "completed" && self.status != "failed"
    }
}

/// A single issue reported by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub scan_id: String,
    pub severity: String,
    pub path: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub rule_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Finding {
    pub fn severity_label(&self) -> &'static str {
        severity_label(&self.severity)
    }
}

/// A remediation pull request opened by the Remedy worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: String,
    pub repo_id: String,
    pub branch: String,
    #[serde(default)]
    pub pr_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_at: String,
}

impl PullRequest {
    /// Open until the server reports it `merged` or `closed`
    pub fn is_open(&self) -> bool {
        self.status != "merged" && self.status != "closed"
    }
}

/// Body of `GET /repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryList {
    pub items: Vec<Repository>,
}

/// Body of `POST /repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRepository {
    pub url: String,
}

/// Body of `POST /scans`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub repo_id: String,
    pub kinds: Vec<String>,
}

/// Response of `POST /scans`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanQueued {
    pub repo_id: String,
    pub queued_jobs: Vec<String>,
}

/// The four collections fetched together by one refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub repos: Vec<Repository>,
    pub scans: Vec<Scan>,
    pub findings: Vec<Finding>,
    pub pull_requests: Vec<PullRequest>,
}

/// Badge label for a free-form severity string.
///
/// Known severities map to their lowercase name; anything else is `info`.
pub fn severity_label(severity: &str) -> &'static str {
    match severity.to_lowercase().as_str() {
        "critical" => "critical",
        "high" => "high",
        "medium" => "medium",
        "low" => "low",
        _ => "info",
    }
}
