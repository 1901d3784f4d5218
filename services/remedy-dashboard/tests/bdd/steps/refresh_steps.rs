//! BDD step definitions for dashboard refresh

use cucumber::{given, then, when};

use remedy_dashboard::state::{RefreshMode, RefreshOutcome};

use crate::world::{findings_json, pull_requests_json, repos_json, scans_json, DashboardWorld};

#[given(expr = "the Remedy API lists repositories {string}")]
fn api_lists_repos(world: &mut DashboardWorld, repos: String) {
    world.api.set("GET /repos", 200, &repos_json(&repos));
}

#[given(expr = "the Remedy API lists scans {string} for repository {string}")]
fn api_lists_scans(world: &mut DashboardWorld, scans: String, repo_id: String) {
    world.api.set("GET /scans", 200, &scans_json(&scans, &repo_id));
}

#[given(expr = "the Remedy API lists findings {string} for scan {string}")]
fn api_lists_findings(world: &mut DashboardWorld, findings: String, scan_id: String) {
    world
        .api
        .set("GET /findings", 200, &findings_json(&findings, &scan_id));
}

#[given(expr = "the Remedy API lists pull requests {string}")]
fn api_lists_prs(world: &mut DashboardWorld, prs: String) {
    world.api.set("GET /prs", 200, &pull_requests_json(&prs));
}

#[given(expr = "the Remedy API answers {string} with status {int} and body {string}")]
fn api_answers(world: &mut DashboardWorld, route: String, status: u16, body: String) {
    world.api.set(&route, status, &body);
}

#[given("the Remedy API is unreachable")]
fn api_unreachable(world: &mut DashboardWorld) {
    world.api.set_unreachable(true);
}

#[given("the dashboard has loaded")]
async fn dashboard_loaded(world: &mut DashboardWorld) {
    let outcome = world.dashboard().refresh(RefreshMode::Foreground).await;
    assert!(
        matches!(outcome, RefreshOutcome::Applied { .. }),
        "initial load failed: {:?}",
        outcome
    );
}

#[given(expr = "repository {string} is selected")]
async fn repository_selected(world: &mut DashboardWorld, repo_id: String) {
    let dashboard = world.dashboard();
    dashboard
        .state()
        .write()
        .await
        .select_repo(Some(repo_id));
}

#[when("the dashboard refreshes in the foreground")]
async fn refresh_foreground(world: &mut DashboardWorld) {
    let outcome = world.dashboard().refresh(RefreshMode::Foreground).await;
    world.refresh_outcome = Some(outcome);
}

#[given("the dashboard refreshes in the background")]
#[when("the dashboard refreshes in the background")]
async fn refresh_background(world: &mut DashboardWorld) {
    let outcome = world.dashboard().refresh(RefreshMode::Background).await;
    world.refresh_outcome = Some(outcome);
}

#[when(expr = "the user focuses repository {string}")]
async fn user_focuses_repo(world: &mut DashboardWorld, repo_id: String) {
    let outcome = world.dashboard().select_repo(Some(repo_id)).await;
    world.refresh_outcome = Some(outcome);
}

#[given(expr = "the user focuses scan {string}")]
#[when(expr = "the user focuses scan {string}")]
async fn user_focuses_scan(world: &mut DashboardWorld, scan_id: String) {
    let outcome = world.dashboard().select_scan(Some(scan_id)).await;
    world.refresh_outcome = Some(outcome);
}

#[then(expr = "the dashboard shows {int} repositories, {int} scans, {int} findings, and {int} pull requests")]
async fn dashboard_shows_counts(
    world: &mut DashboardWorld,
    repos: usize,
    scans: usize,
    findings: usize,
    prs: usize,
) {
    let counts = world
        .with_state(|s| {
            (
                s.repos.len(),
                s.scans.len(),
                s.findings.len(),
                s.pull_requests.len(),
            )
        })
        .await;
    assert_eq!(counts, (repos, scans, findings, prs));
}

#[then("the dashboard shows no error")]
async fn dashboard_no_error(world: &mut DashboardWorld) {
    let (error, loading, refreshed) = world
        .with_state(|s| (s.error.clone(), s.loading, s.last_refreshed_epoch_ms))
        .await;
    assert_eq!(error, None);
    assert!(!loading);
    assert!(refreshed.is_some());
}

#[then(expr = "the dashboard shows the error {string}")]
async fn dashboard_shows_error(world: &mut DashboardWorld, expected: String) {
    let error = world.with_state(|s| s.error.clone()).await;
    assert_eq!(error.as_deref(), Some(expected.as_str()));
}

#[then("the refresh should fail")]
fn refresh_failed(world: &mut DashboardWorld) {
    let outcome = world.refresh_outcome.as_ref().expect("no refresh outcome");
    assert!(
        matches!(outcome, RefreshOutcome::Failed { .. }),
        "expected failure, got {:?}",
        outcome
    );
}

#[then(expr = "the API should have received {string}")]
fn api_received(world: &mut DashboardWorld, request: String) {
    let requests = world.api.requests();
    assert!(
        requests.contains(&request),
        "{:?} not found in {:?}",
        request,
        requests
    );
}

#[then(expr = "the repository filter should be {string}")]
async fn repo_filter_is(world: &mut DashboardWorld, expected: String) {
    let filter = world.with_state(|s| s.filters.repo_id.clone()).await;
    assert_eq!(filter.as_deref(), Some(expected.as_str()));
}

#[then("the scan filter should be cleared")]
async fn scan_filter_cleared(world: &mut DashboardWorld) {
    let filter = world.with_state(|s| s.filters.scan_id.clone()).await;
    assert_eq!(filter, None);
}
