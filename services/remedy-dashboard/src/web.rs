//! Web dashboard: server-rendered page, JSON view, and form actions

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;

use crate::engine::{current_epoch_ms, Dashboard};
use crate::render;
use crate::state::RefreshMode;
use crate::view::ViewModel;

/// Router state shared by every handler
#[derive(Clone)]
pub struct WebState {
    pub dashboard: Arc<Dashboard>,
    /// Page auto-reload period, in seconds
    pub reload_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct SelectRepoForm {
    #[serde(default)]
    repo_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SelectScanForm {
    #[serde(default)]
    scan_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterForm {
    #[serde(default)]
    url: String,
}

/// Build the dashboard axum router
pub fn build_router(dashboard: Arc<Dashboard>, reload_seconds: u64) -> Router {
    let web_state = WebState {
        dashboard,
        reload_seconds,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/health", get(health_handler))
        .route("/actions/refresh", post(refresh_handler))
        .route("/actions/select-repo", post(select_repo_handler))
        .route("/actions/select-scan", post(select_scan_handler))
        .route("/actions/register", post(register_handler))
        .route("/actions/scan", post(scan_handler))
        .with_state(web_state)
}

async fn current_view(dashboard: &Dashboard) -> ViewModel {
    let state = dashboard.state().read().await;
    ViewModel::from_state(&state)
}

async fn index_handler(State(web): State<WebState>) -> impl IntoResponse {
    let view = current_view(&web.dashboard).await;
    Html(render::render_page(
        &view,
        current_epoch_ms(),
        web.reload_seconds,
    ))
}

async fn view_handler(State(web): State<WebState>) -> impl IntoResponse {
    Json(current_view(&web.dashboard).await)
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

async fn refresh_handler(State(web): State<WebState>) -> Redirect {
    web.dashboard.refresh(RefreshMode::Foreground).await;
    Redirect::to("/")
}

async fn select_repo_handler(
    State(web): State<WebState>,
    Form(form): Form<SelectRepoForm>,
) -> Redirect {
    web.dashboard.select_repo(form.repo_id).await;
    Redirect::to("/")
}

async fn select_scan_handler(
    State(web): State<WebState>,
    Form(form): Form<SelectScanForm>,
) -> Redirect {
    web.dashboard.select_scan(form.scan_id).await;
    Redirect::to("/")
}

// Action failures are already shown inline through the action message.
async fn register_handler(
    State(web): State<WebState>,
    Form(form): Form<RegisterForm>,
) -> Redirect {
    if let Err(e) = web.dashboard.register_repo(&form.url).await {
        tracing::debug!("Register action failed: {}", e);
    }
    Redirect::to("/")
}

async fn scan_handler(State(web): State<WebState>) -> Redirect {
    if let Err(e) = web.dashboard.trigger_selected_scan().await {
        tracing::debug!("Scan action failed: {}", e);
    }
    Redirect::to("/")
}
