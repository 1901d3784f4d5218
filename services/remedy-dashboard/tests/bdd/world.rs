//! BDD test world for the Remedy dashboard

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cucumber::World;
use tokio_util::sync::CancellationToken;

use remedy_dashboard::api::ApiClient;
use remedy_dashboard::engine::{Dashboard, DashboardSettings};
use remedy_dashboard::io::{HttpClient, HttpResponse};
use remedy_dashboard::model::ScanQueued;
use remedy_dashboard::notifier::{Notifier, PullRequestAlert};
use remedy_dashboard::state::{new_state_handle, DashboardState, RefreshOutcome};
use remedy_dashboard::DashboardError;

pub const BASE_URL: &str = "http://remedy.test";

/// Remedy API stand-in answering each "METHOD /path" route with a fixed response
#[derive(Debug, Default)]
pub struct FakeRemedyApi {
    routes: Mutex<HashMap<String, HttpResponse>>,
    unreachable: Mutex<bool>,
    requests: Mutex<Vec<String>>,
}

impl FakeRemedyApi {
    pub fn set(&self, route: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().insert(
            route.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        *self.unreachable.lock().unwrap() = unreachable;
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, url: &str) -> remedy_dashboard::Result<HttpResponse> {
        let target = url.strip_prefix(BASE_URL).unwrap_or(url);
        let path = target.split('?').next().unwrap_or(target);
        self.requests
            .lock()
            .unwrap()
            .push(format!("{} {}", method, target));

        if *self.unreachable.lock().unwrap() {
            return Err(DashboardError::Http("connection refused".to_string()));
        }

        let route = format!("{} {}", method, path);
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&route)
            .cloned()
            .unwrap_or_else(|| HttpResponse {
                status: 200,
                body: if path == "/repos" {
                    r#"{"items":[]}"#.to_string()
                } else {
                    "[]".to_string()
                },
            }))
    }
}

#[async_trait]
impl HttpClient for FakeRemedyApi {
    async fn get(&self, url: &str) -> remedy_dashboard::Result<HttpResponse> {
        self.respond("GET", url)
    }

    async fn post_json(
        &self,
        url: &str,
        _body: &serde_json::Value,
    ) -> remedy_dashboard::Result<HttpResponse> {
        self.respond("POST", url)
    }
}

/// Notifier that records every alert it is asked to deliver
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<PullRequestAlert>>,
    pub fail: Mutex<bool>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn type_name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, alert: &PullRequestAlert) -> remedy_dashboard::Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        if *self.fail.lock().unwrap() {
            return Err(DashboardError::Notifier("speaker unplugged".to_string()));
        }
        Ok(())
    }
}

#[derive(Default, World)]
pub struct DashboardWorld {
    pub api: Arc<FakeRemedyApi>,
    pub notifier: Arc<RecordingNotifier>,
    pub dashboard: Option<Arc<Dashboard>>,
    pub refresh_outcome: Option<RefreshOutcome>,
    pub action_result: Option<remedy_dashboard::Result<ScanQueued>>,
    pub api_error: Option<DashboardError>,
    pub severity: Option<String>,
}

impl std::fmt::Debug for DashboardWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardWorld")
            .field("api", &self.api)
            .field("notifier", &self.notifier)
            .field("refresh_outcome", &self.refresh_outcome)
            .field("action_result", &self.action_result)
            .field("api_error", &self.api_error)
            .finish()
    }
}

impl DashboardWorld {
    /// The mounted dashboard, created on first use
    pub fn dashboard(&mut self) -> Arc<Dashboard> {
        if let Some(dashboard) = &self.dashboard {
            return Arc::clone(dashboard);
        }
        let http: Arc<dyn HttpClient> = self.api.clone();
        let notifier: Arc<dyn Notifier> = self.notifier.clone();
        let dashboard = Arc::new(Dashboard::new(
            Arc::new(ApiClient::new(BASE_URL, http)),
            notifier,
            new_state_handle(20),
            DashboardSettings {
                refresh_interval: Duration::from_secs(15),
                toast_duration: Duration::from_secs(6),
                scan_kinds: vec!["sast".to_string(), "sca".to_string()],
            },
            CancellationToken::new(),
        ));
        self.dashboard = Some(Arc::clone(&dashboard));
        dashboard
    }

    pub fn api_client(&self) -> ApiClient {
        let http: Arc<dyn HttpClient> = self.api.clone();
        ApiClient::new(BASE_URL, http)
    }

    /// Run `f` against a read-locked view of the dashboard state
    pub async fn with_state<R>(&mut self, f: impl FnOnce(&DashboardState) -> R) -> R {
        let dashboard = self.dashboard();
        let state = dashboard.state().read().await;
        f(&state)
    }

    pub fn notified_branches(&self) -> Vec<String> {
        self.notifier
            .alerts
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.branch.clone())
            .collect()
    }
}

/// JSON for a repository list with the given `id:name` pairs
pub fn repos_json(list: &str) -> String {
    let items: Vec<serde_json::Value> = split_list(list)
        .into_iter()
        .map(|entry| {
            let (id, name) = entry.split_once(':').unwrap_or((entry.as_str(), entry.as_str()));
            serde_json::json!({
                "id": id,
                "name": name,
                "url": format!("https://github.com/acme/{}", name),
                "created_at": "2024-05-01T10:00:00Z",
            })
        })
        .collect();
    serde_json::json!({ "items": items }).to_string()
}

/// JSON for scans of a repository with the given ids
pub fn scans_json(ids: &str, repo_id: &str) -> String {
    let scans: Vec<serde_json::Value> = split_list(ids)
        .into_iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "repo_id": repo_id,
                "kind": "sast",
                "status": "completed",
                "created_at": "2024-05-01T10:00:00Z",
            })
        })
        .collect();
    serde_json::Value::Array(scans).to_string()
}

/// JSON for findings of a scan with the given ids
pub fn findings_json(ids: &str, scan_id: &str) -> String {
    let findings: Vec<serde_json::Value> = split_list(ids)
        .into_iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "scan_id": scan_id,
                "severity": "high",
                "path": "app/main.py",
            })
        })
        .collect();
    serde_json::Value::Array(findings).to_string()
}

/// JSON for open pull requests with the given `id:branch` pairs
pub fn pull_requests_json(list: &str) -> String {
    let prs: Vec<serde_json::Value> = split_list(list)
        .into_iter()
        .map(|entry| {
            let (id, branch) = entry.split_once(':').unwrap_or((entry.as_str(), entry.as_str()));
            serde_json::json!({
                "id": id,
                "repo_id": "r1",
                "branch": branch,
                "pr_url": format!("https://github.com/acme/widgets/pull/{}", id),
                "status": "open",
                "created_at": "2024-05-01T10:00:00Z",
            })
        })
        .collect();
    serde_json::Value::Array(prs).to_string()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
