//! Scenario runs on a paused tokio clock.

use std::{path::PathBuf, sync::Arc, time::Duration};

use pip_config::PipConfig;
use pip_geom::Rect;
use pip_transitions::PipState;
use pipctl::{
    Error,
    runner::{self, LEASH, Simulator},
    scenario::{Scenario, Step},
};

/// Frame interval used by every test.
const FRAME: Duration = Duration::from_millis(16);

/// Path of a bundled scenario.
fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

/// Load a bundled scenario.
fn load(name: &str) -> Scenario {
    Scenario::load(&bundled(name)).expect("bundled scenario parses")
}

/// Default configuration.
fn config() -> Arc<PipConfig> {
    Arc::new(PipConfig::default())
}

#[tokio::test(start_paused = true)]
async fn enter_then_expand_exits() {
    let report = runner::run(config(), &load("enter_expand.ron"), FRAME)
        .await
        .expect("scenario runs");
    assert_eq!(report.final_state, PipState::ExitedPip);
    let states: Vec<&str> = report
        .transcript
        .iter()
        .filter(|l| l.contains(" -> "))
        .map(String::as_str)
        .collect();
    assert_eq!(
        states,
        vec![
            "  undefined -> entering-pip",
            "  entering-pip -> entered-pip",
            "  entered-pip -> exiting-pip",
            "  exiting-pip -> exited-pip",
        ]
    );
    assert_eq!(
        report
            .transcript
            .iter()
            .filter(|l| l.starts_with("  finished"))
            .count(),
        2
    );
    assert!(report.frames_applied > 10);
}

#[tokio::test(start_paused = true)]
async fn resize_commits_bounds_before_faded_removal() {
    let scenario = load("resize_then_remove.ron");
    let mut sim = Simulator::new(config(), &scenario, FRAME);
    for (i, step) in scenario.steps.iter().enumerate().take(6) {
        sim.step(i, step).await.expect("step runs");
    }
    assert_eq!(sim.shell().transition_state().state(), PipState::ScheduledBoundsChange);

    for (i, step) in scenario.steps.iter().enumerate().skip(6) {
        sim.step(i, step).await.expect("step runs");
    }
    assert_eq!(sim.composer().alpha(LEASH), Some(0.0));
    assert!(!sim.shell().scheduler().has_overlay_animator());
    let report = sim.finish().await;
    assert_eq!(report.final_state, PipState::ExitedPip);
    assert_eq!(report.final_bounds, Rect::new(300.0, 1500.0, 640.0, 360.0));
}

#[tokio::test(start_paused = true)]
async fn expand_to_split_runs_on_rotated_display() {
    let report = runner::run(config(), &load("expand_to_split.ron"), FRAME)
        .await
        .expect("scenario runs");
    assert_eq!(report.final_state, PipState::ExitedPip);
}

#[tokio::test(start_paused = true)]
async fn aborted_enter_can_be_retried() {
    let report = runner::run(config(), &load("abort_enter.ron"), FRAME)
        .await
        .expect("scenario runs");
    assert!(report.transcript.iter().any(|l| l.ends_with("(aborted)")));
    assert_eq!(report.final_state, PipState::EnteredPip);
    assert!(!report.final_bounds.is_empty());
}

#[tokio::test(start_paused = true)]
async fn deliver_without_pending_transition_fails() {
    let mut scenario = load("enter_expand.ron");
    scenario.steps = vec![Step::Deliver];
    let err = runner::run(config(), &scenario, FRAME)
        .await
        .expect_err("nothing to deliver");
    assert!(matches!(err, Error::Step { index: 0, .. }), "{err}");
}

#[tokio::test(start_paused = true)]
async fn requests_before_enter_are_ignored() {
    let mut scenario = load("enter_expand.ron");
    scenario.steps = vec![Step::Expand, Step::Remove { fade: true }];
    let report = runner::run(config(), &scenario, FRAME)
        .await
        .expect("scenario runs");
    assert_eq!(
        report
            .transcript
            .iter()
            .filter(|l| l.as_str() == "  ignored")
            .count(),
        2
    );
    assert_eq!(report.final_state, PipState::Undefined);
}
