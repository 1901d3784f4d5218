//! BDD step definitions for new pull request announcements

use cucumber::{given, then};

use remedy_dashboard::state::RefreshOutcome;

use crate::world::DashboardWorld;

#[given("the notifier fails")]
fn notifier_fails(world: &mut DashboardWorld) {
    *world.notifier.fail.lock().unwrap() = true;
}

#[then("no toast should be shown")]
async fn no_toast(world: &mut DashboardWorld) {
    let toast = world.with_state(|s| s.toast.clone()).await;
    assert_eq!(toast, None);
}

#[then(expr = "the toast should read {string}")]
async fn toast_reads(world: &mut DashboardWorld, expected: String) {
    let toast = world
        .with_state(|s| s.toast.clone())
        .await
        .expect("no toast shown");
    assert_eq!(toast.message, expected);
}

#[then(expr = "the toast should link to {string}")]
async fn toast_links(world: &mut DashboardWorld, expected: String) {
    let toast = world
        .with_state(|s| s.toast.clone())
        .await
        .expect("no toast shown");
    assert_eq!(toast.url.as_deref(), Some(expected.as_str()));
}

#[then("the notifier should not have been called")]
fn notifier_not_called(world: &mut DashboardWorld) {
    assert!(world.notified_branches().is_empty());
}

#[then(expr = "the notifier should have announced {string} once")]
fn notifier_announced_once(world: &mut DashboardWorld, branch: String) {
    assert_eq!(world.notified_branches(), vec![branch]);
}

#[then(expr = "the refresh should report new pull request {string}")]
fn refresh_reports_new_pr(world: &mut DashboardWorld, pr_id: String) {
    match world.refresh_outcome.as_ref().expect("no refresh outcome") {
        RefreshOutcome::Applied {
            new_pull_request: Some(pr),
        } => assert_eq!(pr.id, pr_id),
        other => panic!("expected a new pull request, got {:?}", other),
    }
}

#[then(expr = "the alert history should hold {int} failed alert(s)")]
async fn history_failed(world: &mut DashboardWorld, count: usize) {
    let failed = world
        .with_state(|s| {
            s.history
                .iter()
                .filter(|a| !a.success && a.error.is_some())
                .count()
        })
        .await;
    assert_eq!(failed, count);
}
