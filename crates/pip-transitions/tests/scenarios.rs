//! End-to-end request flows against mock collaborators.

use std::sync::Arc;

use parking_lot::Mutex;
use pip_bounds::{DisplayLayout, PipParams};
use pip_geom::{Point, Rect, Rotation};
use pip_ids::{ContainerToken, DisplayId, SurfaceId, TaskId, TransitionHandle};
use pip_transitions::{
    Animator, BoundsUpdate, PipShell, PipState, PipTask, StateExtra, SurfaceOp, TransitionChange,
    TransitionInfo, TransitionPhase, TransitionType, WindowingMode,
    test_support::{FinishProbe, LEASH, MockEnv, TASK_TOKEN, deliver, pip_task, ready_info},
};

/// Record every `(old, new)` state pair.
fn record_states(shell: &PipShell) -> Arc<Mutex<Vec<(PipState, PipState)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    shell
        .transition_state()
        .add_listener(move |old, new, _| sink.lock().push((old, new)));
    seen
}

/// The bounds a submitted transaction sets on the test task.
fn submitted_bounds(env: &MockEnv) -> Rect {
    let (_, _, txn) = env.transitions.last().expect("a submission");
    match txn.change_for(TASK_TOKEN).and_then(|c| c.bounds) {
        Some(BoundsUpdate::Set(r)) => r,
        other => panic!("no bounds in transaction: {other:?}"),
    }
}

/// Run `task` all the way into PiP; returns the settled bounds.
fn enter_task(env: &MockEnv, shell: &PipShell, task: PipTask) -> Rect {
    let from = task.info.bounds;
    let handle = shell
        .scheduler()
        .schedule_enter_pip(task, LEASH)
        .expect("enter submitted");
    let dest = submitted_bounds(env);
    let probe = FinishProbe::default();
    let info = ready_info(TransitionType::EnterPip, from, dest);
    assert!(deliver(shell, handle, &info, &probe).is_some());
    env.animators.last().expect("enter animator").end();
    assert_eq!(probe.count(), 1);
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    dest
}

/// Default task into PiP.
fn enter(env: &MockEnv, shell: &PipShell) -> Rect {
    enter_task(env, shell, pip_task(PipParams::default()))
}

/// Number of expand submissions.
fn expand_count(env: &MockEnv) -> usize {
    env.transitions
        .submitted()
        .iter()
        .filter(|(_, t, _)| matches!(t, TransitionType::ExitPip | TransitionType::ExitPipToSplit))
        .count()
}

#[test]
fn expand_without_split_submits_one_exit() {
    let env = MockEnv::new();
    let shell = env.shell();
    let states = record_states(&shell);
    enter(&env, &shell);
    assert_eq!(
        *states.lock(),
        vec![
            (PipState::Undefined, PipState::EnteringPip),
            (PipState::EnteringPip, PipState::EnteredPip),
        ]
    );

    let handle = shell.scheduler().schedule_exit_via_expand();
    assert!(handle.is_some());
    assert_eq!(expand_count(&env), 1);
    assert!(env.log.calls().iter().all(|c| !c.starts_with("split.prepare")));
    let (_, kind, txn) = env.transitions.last().expect("expand submitted");
    assert_eq!(kind, TransitionType::ExitPip);
    let change = txn.change_for(TASK_TOKEN).expect("task change");
    assert_eq!(change.bounds, Some(BoundsUpdate::Clear));
    assert_eq!(change.windowing_mode, Some(WindowingMode::Undefined));
    assert_eq!(shell.transition_state().state(), PipState::ExitingPip);
}

#[test]
fn expand_into_split_prepares_split_first() {
    let env = MockEnv::new();
    let shell = env.shell();
    let mut task = pip_task(PipParams::default());
    task.info.last_parent_task = Some(TaskId::new(9));
    env.split.set_in_split(TaskId::new(9));
    enter_task(&env, &shell, task);

    assert!(shell.scheduler().schedule_exit_via_expand().is_some());
    let prepare = env
        .log
        .position("split.prepare task#42 Undefined")
        .expect("split prepared");
    let start = env
        .log
        .position("start_transition exit-pip-to-split")
        .expect("expand submitted");
    assert!(prepare < start);
    assert_eq!(env.log.count("split.prepare task#42 Undefined"), 1);
    assert_eq!(expand_count(&env), 1);
}

#[test]
fn expand_in_desktop_mode_goes_freeform() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    env.desktop.set_active(true);
    shell.scheduler().schedule_exit_via_expand();
    let (_, _, txn) = env.transitions.last().expect("expand submitted");
    assert_eq!(
        txn.change_for(TASK_TOKEN).and_then(|c| c.windowing_mode),
        Some(WindowingMode::Freeform)
    );
}

#[test]
fn resize_with_config_at_end_marks_change() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let target = Rect::new(100.0, 300.0, 480.0, 270.0);
    let handle = shell
        .scheduler()
        .schedule_animate_resize_pip(target, true, None);
    assert!(handle.is_some());
    let (_, kind, txn) = env.transitions.last().expect("resize submitted");
    assert_eq!(kind, TransitionType::ResizePip);
    assert!(txn.changes().iter().any(|c| c.config_at_transition_end));
    assert_eq!(txn.duration_ms(), Some(shell.context().config.resize_duration_ms));
}

#[test]
fn resize_round_trip_commits_bounds_and_notifies_movement() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let movement = Arc::new(Mutex::new(Vec::new()));
    let sink = movement.clone();
    shell
        .scheduler()
        .set_on_movement_bounds_changed(move |r| sink.lock().push(r));

    let target = Rect::new(100.0, 300.0, 480.0, 270.0);
    let handle = shell
        .scheduler()
        .schedule_animate_resize_pip(target, false, Some(120))
        .expect("resize submitted");
    let states = record_states(&shell);
    let probe = FinishProbe::default();
    let info = ready_info(TransitionType::ResizePip, entered, target);
    assert!(deliver(&shell, handle, &info, &probe).is_some());
    let spec = env.animators.bounds_specs().last().cloned().expect("spec");
    assert_eq!(spec.duration.as_millis(), 120);
    assert!(env.log.contains("latency.begin pip-resize"));

    env.animators.last().expect("resize animator").end();
    assert_eq!(probe.count(), 1);
    assert_eq!(shell.bounds_state().bounds(), target);
    assert_eq!(movement.lock().len(), 1);
    assert_eq!(*states.lock(), vec![(PipState::ScheduledBoundsChange, PipState::EnteredPip)]);
    assert_eq!(shell.context().registry.phase(handle), Some(TransitionPhase::Done));
}

#[test]
fn overlay_fades_in_only_for_non_seamless_resize() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let target = Rect::new(100.0, 300.0, 480.0, 270.0);

    shell
        .scheduler()
        .set_params_supplier(|| PipParams::default().with_seamless_resize(true));
    shell.scheduler().schedule_finish_resize_pip(target);
    assert!(env.animators.alpha_specs().is_empty());
    assert!(!shell.scheduler().has_overlay_animator());

    shell
        .scheduler()
        .set_params_supplier(|| PipParams::default().with_seamless_resize(false));
    shell.scheduler().schedule_finish_resize_pip(target);
    let overlay = env.animators.last().expect("overlay animator");
    assert_eq!(env.animators.alpha_specs().len(), 1);
    assert_eq!(env.log.count(&format!("{} start", overlay.name())), 1);
    assert!(shell.scheduler().has_overlay_animator());
}

#[test]
fn exiting_ends_running_overlay_once() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    shell
        .scheduler()
        .set_params_supplier(|| PipParams::default().with_seamless_resize(false));
    shell
        .scheduler()
        .schedule_finish_resize_pip(Rect::new(100.0, 300.0, 480.0, 270.0));
    let overlay = env.animators.last().expect("overlay animator");
    assert!(overlay.is_started());

    shell
        .transition_state()
        .set_state(PipState::ExitingPip, StateExtra::None);
    assert_eq!(env.log.count(&format!("{} end", overlay.name())), 1);
    assert!(!shell.scheduler().has_overlay_animator());

    // A second exit notification finds nothing to end.
    shell
        .transition_state()
        .set_state(PipState::ExitingPip, StateExtra::None);
    assert_eq!(env.log.count(&format!("{} end", overlay.name())), 1);
}

#[test]
fn remove_preempts_running_resize() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let target = Rect::new(100.0, 300.0, 480.0, 270.0);
    let resize = shell
        .scheduler()
        .schedule_animate_resize_pip(target, false, None)
        .expect("resize submitted");
    let resize_probe = FinishProbe::default();
    deliver(
        &shell,
        resize,
        &ready_info(TransitionType::ResizePip, entered, target),
        &resize_probe,
    );
    let resize_anim = env.animators.last().expect("resize animator");

    let remove = shell
        .scheduler()
        .schedule_remove_pip(true)
        .expect("remove submitted");
    assert!(resize_anim.is_ended());
    assert_eq!(resize_probe.count(), 1);
    let ended = env
        .log
        .position(&format!("{} end", resize_anim.name()))
        .expect("resize ended");
    let submitted = env
        .log
        .position("start_transition remove-pip")
        .expect("remove submitted");
    assert!(ended < submitted);
    assert_eq!(shell.transition_state().state(), PipState::ExitingPip);

    let remove_probe = FinishProbe::default();
    let info = TransitionInfo::new(TransitionType::RemovePip);
    assert!(deliver(&shell, remove, &info, &remove_probe).is_some());
    let fade = env.animators.alpha_specs().last().cloned().expect("fade spec");
    assert_eq!((fade.from, fade.to), (1.0, 0.0));
    env.animators.last().expect("fade animator").end();
    assert_eq!(remove_probe.count(), 1);
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(shell.transition_state().pip_task().is_none());
    assert!(shell.transition_state().pinned_leash().is_none());
}

#[test]
fn remove_without_fade_completes_on_delivery() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_remove_pip(false)
        .expect("remove submitted");
    let probe = FinishProbe::default();
    let info = TransitionInfo::new(TransitionType::RemovePip);
    assert!(deliver(&shell, handle, &info, &probe).is_some());
    assert_eq!(probe.count(), 1);
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(env.animators.alpha_specs().is_empty());
}

#[test]
fn superseded_resize_completes_without_animating() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let target = Rect::new(100.0, 300.0, 480.0, 270.0);
    let resize = shell
        .scheduler()
        .schedule_animate_resize_pip(target, false, None)
        .expect("resize submitted");
    let remove = shell
        .scheduler()
        .schedule_remove_pip(false)
        .expect("remove submitted");
    let built = env.animators.animators().len();

    let probe = FinishProbe::default();
    let info = ready_info(TransitionType::ResizePip, entered, target);
    assert!(deliver(&shell, resize, &info, &probe).is_some());
    assert_eq!(probe.count(), 1);
    assert_eq!(env.animators.animators().len(), built);
    assert_eq!(shell.transition_state().state(), PipState::ExitingPip);

    let probe = FinishProbe::default();
    deliver(&shell, remove, &TransitionInfo::new(TransitionType::RemovePip), &probe);
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
}

#[test]
fn enter_finds_change_through_last_parent() {
    let env = MockEnv::new();
    let shell = env.shell();
    let task = pip_task(PipParams::default());
    let from = task.info.bounds;
    let handle = shell
        .scheduler()
        .schedule_enter_pip(task, LEASH)
        .expect("enter submitted");
    let dest = submitted_bounds(&env);

    let mut unrelated = TransitionChange::new(
        ContainerToken::new(0x99),
        SurfaceId::new(99),
        from,
        from,
    );
    unrelated.last_parent = Some(ContainerToken::new(0x98));
    let mut activity =
        TransitionChange::new(ContainerToken::new(0x71), SurfaceId::new(71), from, dest);
    activity.last_parent = Some(TASK_TOKEN);
    let info = TransitionInfo::new(TransitionType::EnterPip)
        .with_change(unrelated)
        .with_change(activity);

    assert!(deliver(&shell, handle, &info, &FinishProbe::default()).is_some());
    let spec = env.animators.bounds_specs().last().cloned().expect("spec");
    assert_eq!(spec.end, dest);
    assert_eq!(spec.leash, LEASH);
}

#[test]
fn enter_without_matching_change_is_declined() {
    let env = MockEnv::new();
    let shell = env.shell();
    let handle = shell
        .scheduler()
        .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
        .expect("enter submitted");
    let info = TransitionInfo::new(TransitionType::EnterPip).with_change(TransitionChange::new(
        ContainerToken::new(0x99),
        SurfaceId::new(99),
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    ));
    let probe = FinishProbe::default();
    assert!(deliver(&shell, handle, &info, &probe).is_none());
    assert_eq!(probe.count(), 0);
    assert_eq!(
        shell.context().registry.phase(handle),
        Some(TransitionPhase::Submitted)
    );
}

#[test]
fn declined_enter_settles_when_run_without_animation() {
    let env = MockEnv::new();
    let shell = env.shell();
    let handle = shell
        .scheduler()
        .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
        .expect("enter submitted");
    let dest = submitted_bounds(&env);
    let info = TransitionInfo::new(TransitionType::EnterPip).with_change(TransitionChange::new(
        ContainerToken::new(0x99),
        SurfaceId::new(99),
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    ));
    assert!(deliver(&shell, handle, &info, &FinishProbe::default()).is_none());
    shell.router().on_transition_consumed(handle, false);

    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    assert!(!shell.transition_state().is_in_transition());
    assert_eq!(shell.bounds_state().bounds(), dest);
    assert!(shell.context().registry.get(handle).is_none());
    assert!(
        shell
            .scheduler()
            .schedule_animate_resize_pip(Rect::new(100.0, 300.0, 480.0, 270.0), false, None)
            .is_some()
    );
}

#[test]
fn resize_run_without_animation_commits_bounds() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let target = Rect::new(100.0, 300.0, 480.0, 270.0);
    let handle = shell
        .scheduler()
        .schedule_animate_resize_pip(target, false, None)
        .expect("resize submitted");
    shell.router().on_transition_consumed(handle, false);
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    assert_eq!(shell.bounds_state().bounds(), target);
    assert_eq!(env.animators.animators().len(), 1);
}

#[test]
fn expand_remaps_end_bounds_for_fixed_rotation() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_exit_via_expand()
        .expect("expand submitted");

    let mut change = TransitionChange::new(
        TASK_TOKEN,
        LEASH,
        entered,
        Rect::new(0.0, 0.0, 2400.0, 1080.0),
    );
    change.end_fixed_rotation = Some(Rotation::R90);
    let info = TransitionInfo::new(TransitionType::ExitPip).with_change(change);
    let probe = FinishProbe::default();
    assert!(deliver(&shell, handle, &info, &probe).is_some());

    let spec = env.animators.bounds_specs().last().cloned().expect("spec");
    assert_eq!(spec.rotation, Rotation::R90);
    assert_eq!(spec.end, Rect::new(0.0, 0.0, 1080.0, 2400.0));
    assert!(shell.expand_handler().is_animating());

    env.animators.last().expect("expand animator").end();
    assert_eq!(probe.count(), 1);
    assert!(!shell.expand_handler().is_animating());
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(shell.transition_state().pip_task().is_none());
    assert!(env.log.contains("latency.begin pip-expand"));
    assert!(env.log.contains("latency.end pip-expand"));
    let finish = env.composer.applied().last().cloned().expect("finish applied");
    assert!(finish.ops().contains(&SurfaceOp::SetCrop {
        surface: LEASH,
        crop: None
    }));
}

#[test]
fn expand_saves_reentry_for_next_entry() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let fraction = shell
        .algorithm()
        .bounds_to_snap_fraction(&shell.bounds_state().bounds());
    shell.scheduler().schedule_exit_via_expand();
    let saved = shell.bounds_state().reentry_state().expect("reentry saved");
    assert!((saved.snap_fraction - fraction).abs() < 1e-6);
}

#[test]
fn expand_to_split_finishes_split_on_end() {
    let env = MockEnv::new();
    let shell = env.shell();
    let mut task = pip_task(PipParams::default());
    task.info.last_parent_task = Some(TaskId::new(9));
    env.split.set_in_split(TaskId::new(9));
    let entered = enter_task(&env, &shell, task);
    let handle = shell
        .scheduler()
        .schedule_exit_via_expand()
        .expect("expand submitted");
    let info = ready_info(
        TransitionType::ExitPipToSplit,
        entered,
        Rect::new(0.0, 0.0, 1080.0, 1200.0),
    );
    deliver(&shell, handle, &info, &FinishProbe::default());
    env.animators.last().expect("expand animator").end();
    assert!(env.log.contains("split.finish"));
    assert!(env.log.contains("latency.end pip-expand-to-split"));
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
}

#[test]
fn unknown_handle_is_not_handled() {
    let env = MockEnv::new();
    let shell = env.shell();
    let probe = FinishProbe::default();
    let info = ready_info(
        TransitionType::EnterPip,
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    );
    assert!(deliver(&shell, TransitionHandle::new(404), &info, &probe).is_none());
    assert!(shell.router().merge_animation(TransitionHandle::new(404)).is_none());
    assert_eq!(probe.count(), 0);
    shell
        .router()
        .on_transition_consumed(TransitionHandle::new(404), true);
    assert_eq!(shell.transition_state().state(), PipState::Undefined);
}

#[test]
fn delivering_twice_is_declined() {
    let env = MockEnv::new();
    let shell = env.shell();
    let task = pip_task(PipParams::default());
    let from = task.info.bounds;
    let handle = shell
        .scheduler()
        .schedule_enter_pip(task, LEASH)
        .expect("enter submitted");
    let info = ready_info(TransitionType::EnterPip, from, submitted_bounds(&env));
    assert!(deliver(&shell, handle, &info, &FinishProbe::default()).is_some());
    assert!(deliver(&shell, handle, &info, &FinishProbe::default()).is_none());
    assert_eq!(env.animators.animators().len(), 1);
}

#[test]
fn merge_ends_running_enter() {
    let env = MockEnv::new();
    let shell = env.shell();
    let task = pip_task(PipParams::default());
    let from = task.info.bounds;
    let handle = shell
        .scheduler()
        .schedule_enter_pip(task, LEASH)
        .expect("enter submitted");
    let dest = submitted_bounds(&env);
    let probe = FinishProbe::default();
    deliver(
        &shell,
        handle,
        &ready_info(TransitionType::EnterPip, from, dest),
        &probe,
    );
    assert!(shell.router().merge_animation(handle).is_some());
    assert_eq!(probe.count(), 1);
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    assert_eq!(shell.bounds_state().bounds(), dest);
    assert!(shell.context().slot.is_empty());
}

#[test]
fn merge_ends_running_expand() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_exit_via_expand()
        .expect("expand submitted");
    let probe = FinishProbe::default();
    let info = ready_info(
        TransitionType::ExitPip,
        entered,
        Rect::new(0.0, 0.0, 1080.0, 2400.0),
    );
    assert!(deliver(&shell, handle, &info, &probe).is_some());
    assert!(shell.expand_handler().is_animating());
    let animator = env.animators.last().expect("expand animator");

    assert!(shell.router().merge_animation(handle).is_some());
    assert_eq!(env.log.count(&format!("{} end", animator.name())), 1);
    assert_eq!(probe.count(), 1);
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(!shell.expand_handler().is_animating());
    assert!(shell.context().slot.is_empty());
}

#[test]
fn expand_end_when_idle_is_noop() {
    let env = MockEnv::new();
    let shell = env.shell();
    let idle = env.log.calls().len();
    shell.expand_handler().end();
    assert_eq!(env.log.calls().len(), idle);

    enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_animate_resize_pip(Rect::new(100.0, 300.0, 480.0, 270.0), false, None)
        .expect("resize submitted");
    let info = ready_info(
        TransitionType::ResizePip,
        shell.bounds_state().bounds(),
        Rect::new(100.0, 300.0, 480.0, 270.0),
    );
    deliver(&shell, handle, &info, &FinishProbe::default());
    let resize = env.animators.last().expect("resize animator");
    let calls = env.log.calls().len();

    shell.expand_handler().end();
    assert!(resize.is_started());
    assert_eq!(env.log.calls().len(), calls);
    assert_eq!(
        shell.transition_state().state(),
        PipState::ScheduledBoundsChange
    );
}

#[test]
fn merge_into_superseded_transition_is_declined() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let resize = shell
        .scheduler()
        .schedule_animate_resize_pip(Rect::new(100.0, 300.0, 480.0, 270.0), false, None)
        .expect("resize submitted");
    let remove = shell
        .scheduler()
        .schedule_remove_pip(true)
        .expect("remove submitted");
    let current = shell.bounds_state().bounds();
    deliver(
        &shell,
        remove,
        &ready_info(TransitionType::RemovePip, current, current),
        &FinishProbe::default(),
    );
    let fade = env.animators.last().expect("fade animator");
    assert!(fade.is_started());

    assert!(shell.router().merge_animation(resize).is_none());
    assert!(fade.is_started());
    assert_eq!(shell.transition_state().state(), PipState::ExitingPip);
}

#[test]
fn aborted_enter_rolls_back() {
    let env = MockEnv::new();
    let shell = env.shell();
    let extras = Arc::new(Mutex::new(Vec::new()));
    let sink = extras.clone();
    shell
        .transition_state()
        .add_listener(move |_, new, extra| sink.lock().push((new, extra.clone())));
    let handle = shell
        .scheduler()
        .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
        .expect("enter submitted");
    shell.router().on_transition_consumed(handle, true);

    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(shell.transition_state().pip_task().is_none());
    assert_eq!(
        extras.lock().last().cloned(),
        Some((PipState::ExitedPip, StateExtra::Aborted))
    );
    assert!(shell.context().registry.get(handle).is_none());
}

#[test]
fn aborted_resize_returns_to_entered() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_animate_resize_pip(Rect::new(100.0, 300.0, 480.0, 270.0), false, None)
        .expect("resize submitted");
    shell.router().on_transition_consumed(handle, true);
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    assert!(shell.transition_state().pip_task().is_some());
}

#[test]
fn remove_run_without_animation_exits() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let handle = shell
        .scheduler()
        .schedule_remove_pip(false)
        .expect("remove submitted");
    shell.router().on_transition_consumed(handle, false);
    assert_eq!(shell.transition_state().state(), PipState::ExitedPip);
    assert!(shell.transition_state().pip_task().is_none());
}

#[test]
fn consuming_a_finished_transition_leaves_state() {
    let env = MockEnv::new();
    let shell = env.shell();
    enter(&env, &shell);
    let (handle, _, _) = env.transitions.last().expect("enter submitted");
    shell.router().on_transition_consumed(handle, false);
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
}

#[test]
fn idle_callbacks_wait_for_entered() {
    let env = MockEnv::new();
    let shell = env.shell();
    let task = pip_task(PipParams::default());
    let from = task.info.bounds;
    let handle = shell
        .scheduler()
        .schedule_enter_pip(task, LEASH)
        .expect("enter submitted");
    let ran = Arc::new(Mutex::new(0));
    let counter = ran.clone();
    shell
        .transition_state()
        .run_when_idle(move || *counter.lock() += 1);
    assert_eq!(*ran.lock(), 0);

    let info = ready_info(TransitionType::EnterPip, from, submitted_bounds(&env));
    deliver(&shell, handle, &info, &FinishProbe::default());
    env.animators.last().expect("enter animator").end();
    assert_eq!(*ran.lock(), 1);
}

#[test]
fn enter_refused_during_transition() {
    let env = MockEnv::new();
    let shell = env.shell();
    shell
        .scheduler()
        .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
        .expect("enter submitted");
    assert!(
        shell
            .scheduler()
            .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
            .is_none()
    );
    assert_eq!(env.transitions.submitted().len(), 1);
}

#[test]
fn enter_refused_while_in_pip() {
    let env = MockEnv::new();
    let shell = env.shell();
    let settled = enter(&env, &shell);
    let states = record_states(&shell);
    let mut other = pip_task(PipParams::default());
    other.token = ContainerToken::new(0x71);
    other.info.task_id = TaskId::new(43);

    assert!(shell.scheduler().schedule_enter_pip(other, SurfaceId::new(8)).is_none());
    assert_eq!(env.transitions.submitted().len(), 1);
    assert!(states.lock().is_empty());
    assert_eq!(shell.transition_state().state(), PipState::EnteredPip);
    assert_eq!(shell.transition_state().pip_task_token(), Some(TASK_TOKEN));
    assert_eq!(shell.transition_state().pinned_leash(), Some(LEASH));
    assert_eq!(shell.bounds_state().bounds(), settled);
}

#[test]
fn enter_uses_current_display_layout() {
    let env = MockEnv::new();
    let shell = env.shell();
    let mut layout = DisplayLayout::new(DisplayId::new(2), 2400.0, 1080.0);
    layout.rotation = Rotation::R90;
    env.display.set_layout(layout.clone());
    shell
        .scheduler()
        .schedule_enter_pip(pip_task(PipParams::default()), LEASH)
        .expect("enter submitted");
    assert_eq!(shell.bounds_state().display_layout(), layout);
    let dest = submitted_bounds(&env);
    assert!(shell.algorithm().inset_bounds().contains(&dest));
}

#[test]
fn user_resize_scales_leash_without_transition() {
    let env = MockEnv::new();
    let shell = env.shell();
    let entered = enter(&env, &shell);
    let submitted = env.transitions.submitted().len();
    let target = Rect::new(
        entered.x,
        entered.y,
        entered.w * 2.0,
        entered.h * 2.0,
    );
    shell.scheduler().schedule_user_resize_pip(target, 0.0);
    assert_eq!(env.transitions.submitted().len(), submitted);
    let txn = env.composer.applied().last().cloned().expect("applied");
    let Some(SurfaceOp::SetMatrix { surface, matrix }) = txn.ops().first().cloned() else {
        panic!("expected a matrix op");
    };
    assert_eq!(surface, LEASH);
    let mapped = matrix.map_point(Point::new(entered.w, entered.h));
    assert!((mapped.x - (target.x + target.w)).abs() < 1e-6);
    assert!((mapped.y - (target.y + target.h)).abs() < 1e-6);

    // Empty targets are ignored.
    let applied = env.composer.applied().len();
    shell
        .scheduler()
        .schedule_user_resize_pip(Rect::new(0.0, 0.0, 0.0, 0.0), 0.0);
    assert_eq!(env.composer.applied().len(), applied);
}
