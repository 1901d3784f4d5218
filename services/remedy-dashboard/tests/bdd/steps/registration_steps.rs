//! BDD step definitions for repository registration and scan triggering

use cucumber::{then, when};

use crate::world::DashboardWorld;

#[when(expr = "the user registers {string}")]
async fn user_registers(world: &mut DashboardWorld, url: String) {
    let result = world.dashboard().register_repo(&url).await;
    world.action_result = Some(result);
}

#[when("the user starts a scan")]
async fn user_starts_scan(world: &mut DashboardWorld) {
    let result = world.dashboard().trigger_selected_scan().await;
    world.action_result = Some(result);
}

#[then("the action should succeed")]
fn action_succeeds(world: &mut DashboardWorld) {
    let result = world.action_result.as_ref().expect("no action result");
    assert!(result.is_ok(), "action failed: {:?}", result);
}

#[then("the action should fail")]
fn action_fails(world: &mut DashboardWorld) {
    let result = world.action_result.as_ref().expect("no action result");
    assert!(result.is_err());
}

#[then(expr = "the action message should be {string}")]
async fn action_message_is(world: &mut DashboardWorld, expected: String) {
    let message = world.with_state(|s| s.action_message.clone()).await;
    assert_eq!(message.as_deref(), Some(expected.as_str()));
}

#[then("the dashboard should not be registering")]
async fn not_registering(world: &mut DashboardWorld) {
    assert!(!world.with_state(|s| s.registering).await);
}

#[then("no POST request should have been sent")]
fn no_post(world: &mut DashboardWorld) {
    let requests = world.api.requests();
    assert!(
        requests.iter().all(|r| !r.starts_with("POST ")),
        "unexpected POST in {:?}",
        requests
    );
}
