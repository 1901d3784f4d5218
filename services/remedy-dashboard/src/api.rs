//! Typed client for the Remedy REST API

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::io::{HttpClient, HttpResponse};
use crate::model::{
    Finding, PullRequest, RegisterRepository, Repository, RepositoryList, Scan, ScanQueued,
    ScanRequest,
};
use crate::DashboardError;

/// FastAPI-style error body: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Client for the Remedy API rooted at a base URL
pub struct ApiClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created ApiClient for {}", base_url);
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /repos`
    pub async fn fetch_repos(&self) -> crate::Result<Vec<Repository>> {
        let list: RepositoryList = self.get("/repos", &[]).await?;
        Ok(list.items)
    }

    /// `GET /scans`, optionally limited to one repository
    pub async fn fetch_scans(&self, repo_id: Option<&str>) -> crate::Result<Vec<Scan>> {
        let params: Vec<(&str, &str)> = repo_id.map(|id| ("repo_id", id)).into_iter().collect();
        self.get("/scans", &params).await
    }

    /// `GET /findings`, optionally limited by repository and/or scan
    pub async fn fetch_findings(
        &self,
        repo_id: Option<&str>,
        scan_id: Option<&str>,
    ) -> crate::Result<Vec<Finding>> {
        let mut params = Vec::new();
        if let Some(id) = repo_id {
            params.push(("repo_id", id));
        }
        if let Some(id) = scan_id {
            params.push(("scan_id", id));
        }
        self.get("/findings", &params).await
    }

    /// `GET /prs`, optionally limited to one repository
    pub async fn fetch_pull_requests(
        &self,
        repo_id: Option<&str>,
    ) -> crate::Result<Vec<PullRequest>> {
        let params: Vec<(&str, &str)> = repo_id.map(|id| ("repo_id", id)).into_iter().collect();
        self.get("/prs", &params).await
    }

    /// `POST /repos`: register a repository by URL
    pub async fn register_repo(&self, url: &str) -> crate::Result<Repository> {
        let body = serde_json::to_value(RegisterRepository {
            url: url.to_string(),
        })?;
        self.post("/repos", &body).await
    }

    /// `POST /scans`: queue scans of the given kinds for a repository
    pub async fn trigger_scan(&self, repo_id: &str, kinds: &[String]) -> crate::Result<ScanQueued> {
        let body = serde_json::to_value(ScanRequest {
            repo_id: repo_id.to_string(),
            kinds: kinds.to_vec(),
        })?;
        self.post("/scans", &body).await
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> crate::Result<String> {
        let raw = format!("{}{}", self.base_url, path);
        if params.is_empty() {
            return Ok(raw);
        }
        reqwest::Url::parse_with_params(&raw, params)
            .map(|url| url.to_string())
            .map_err(|e| DashboardError::Config(format!("Invalid API URL {}: {}", raw, e)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> crate::Result<T> {
        let url = self.url(path, params)?;
        let response = self.http.get(&url).await?;
        decode(path, response)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> crate::Result<T> {
        let url = self.url(path, &[])?;
        let response = self.http.post_json(&url, body).await?;
        decode(path, response)
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: HttpResponse) -> crate::Result<T> {
    if !response.is_success() {
        let message = error_message(&response);
        tracing::debug!("{} returned {}: {}", path, response.status, message);
        return Err(DashboardError::Api {
            status: response.status,
            message,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| DashboardError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

/// Human-readable message for a failed response: the `detail` field if the
/// body carries one, else the body text, else the status reason.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(&response.body) {
        match detail {
            serde_json::Value::String(text) if !text.is_empty() => return text,
            serde_json::Value::String(_) | serde_json::Value::Null => {}
            other => return other.to_string(),
        }
    }

    let body = response.body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", response.status))
}
