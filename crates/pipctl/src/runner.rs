//! Scenario runner: wires a [`PipShell`] to simulated collaborators and
//! executes scenario steps against it.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use pip_bounds::DisplayLayout;
use pip_config::PipConfig;
use pip_geom::Rect;
use pip_ids::{SurfaceId, TransitionHandle};
use pip_transitions::{
    BoundsUpdate, Collaborators, FrameAnimatorFactory, FrameClock, PipShell, PipState, PipTask,
    StateExtra, SurfaceTransaction, TransitionChange, TransitionInfo, TransitionType,
};
use tokio::time;
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    pump::FramePump,
    scenario::{Scenario, Step},
    sim::{
        Pending, SimComposer, SimDesktop, SimDisplay, SimLatency, SimSplit, SimTransitionManager,
    },
};

/// Leash of the simulated task.
pub const LEASH: SurfaceId = SurfaceId::new(1);

/// Outcome of a scenario run.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// Steps and state changes in order.
    pub transcript: Vec<String>,
    /// Lifecycle state after the last step.
    pub final_state: PipState,
    /// Committed PiP bounds after the last step.
    pub final_bounds: Rect,
    /// Surface transactions applied, frames included.
    pub frames_applied: u64,
}

/// A shell plus the simulated world around it.
pub struct Simulator {
    /// System under test.
    shell: PipShell,
    /// Queue of submitted transitions.
    transitions: Arc<SimTransitionManager>,
    /// Surface sink.
    composer: Arc<SimComposer>,
    /// Drives the frame animators.
    pump: FramePump,
    /// Task entered by `enter` steps.
    task: PipTask,
    /// Display the scenario runs on.
    layout: DisplayLayout,
    /// Shared transcript.
    transcript: Arc<Mutex<Vec<String>>>,
    /// Handles whose finish callback ran and that are not yet consumed.
    finished: Arc<Mutex<Vec<TransitionHandle>>>,
    /// Most recently delivered transition.
    last_delivered: Option<TransitionHandle>,
}

impl Simulator {
    /// Build the simulated world for `scenario`. Must be called from inside a
    /// tokio runtime; the frame pump starts immediately.
    pub fn new(config: Arc<PipConfig>, scenario: &Scenario, frame_interval: Duration) -> Self {
        let layout = scenario.display.clone();
        let task = scenario.task.to_task(&layout);
        let clock = FrameClock::new();
        let transitions = Arc::new(SimTransitionManager::default());
        let composer = Arc::new(SimComposer::default());
        let hosted = scenario
            .task
            .last_parent_in_split
            .then(|| scenario.task.parent_task());
        let collab = Collaborators {
            transitions: transitions.clone(),
            composer: composer.clone(),
            animators: Arc::new(FrameAnimatorFactory::new(clock.clone(), composer.clone())),
            latency: Arc::new(SimLatency),
            display: Arc::new(SimDisplay(layout.clone())),
            split: Some(Arc::new(SimSplit { hosted })),
            desktop: Some(Arc::new(SimDesktop(scenario.desktop_mode))),
        };
        let shell = PipShell::new(config, collab);

        let transcript = Arc::new(Mutex::new(Vec::new()));
        let sink = transcript.clone();
        shell.transition_state().add_listener(move |old, new, extra| {
            let line = match extra {
                StateExtra::None => format!("  {old} -> {new}"),
                StateExtra::BoundsChange {
                    destination,
                    duration_ms,
                } => format!("  {old} -> {new} ({destination} over {duration_ms}ms)"),
                StateExtra::Aborted => format!("  {old} -> {new} (aborted)"),
            };
            sink.lock().push(line);
        });

        Self {
            shell,
            transitions,
            composer,
            pump: FramePump::start(clock, frame_interval),
            task,
            layout,
            transcript,
            finished: Arc::default(),
            last_delivered: None,
        }
    }

    /// The shell under test.
    pub fn shell(&self) -> &PipShell {
        &self.shell
    }

    /// The simulated composer.
    pub fn composer(&self) -> &SimComposer {
        &self.composer
    }

    /// Append a transcript line.
    fn note(&self, line: String) {
        self.transcript.lock().push(line);
    }

    /// Run one step.
    pub async fn step(&mut self, index: usize, step: &Step) -> Result<()> {
        self.note(format!("#{index} {step}"));
        let scheduler = self.shell.scheduler().clone();
        match step {
            Step::Enter => {
                let handle = scheduler.schedule_enter_pip(self.task.clone(), LEASH);
                self.note_request(handle);
            }
            Step::Resize {
                bounds,
                config_at_end,
                duration_ms,
            } => {
                let handle =
                    scheduler.schedule_animate_resize_pip(*bounds, *config_at_end, *duration_ms);
                self.note_request(handle);
            }
            Step::UserResize { bounds, rotation } => {
                scheduler.schedule_user_resize_pip(*bounds, *rotation);
            }
            Step::FinishResize(bounds) => scheduler.schedule_finish_resize_pip(*bounds),
            Step::Expand => {
                let handle = scheduler.schedule_exit_via_expand();
                self.note_request(handle);
            }
            Step::Remove { fade } => {
                let handle = scheduler.schedule_remove_pip(*fade);
                self.note_request(handle);
            }
            Step::Deliver => {
                let pending = self.transitions.pop().ok_or_else(|| Error::Step {
                    index,
                    step: step.to_string(),
                    message: "no transition is waiting for geometry".into(),
                })?;
                self.deliver(&pending);
            }
            Step::Merge => {
                let target = self.last_delivered.ok_or_else(|| Error::Step {
                    index,
                    step: step.to_string(),
                    message: "nothing has been delivered".into(),
                })?;
                if self.shell.router().merge_animation(target).is_none() {
                    self.note(format!("  merge into {target} ignored"));
                }
            }
            Step::Abort => {
                let pending = self.transitions.pop().ok_or_else(|| Error::Step {
                    index,
                    step: step.to_string(),
                    message: "no transition is waiting for geometry".into(),
                })?;
                warn!(handle = %pending.handle, "aborting transition");
                self.shell
                    .router()
                    .on_transition_consumed(pending.handle, true);
            }
            Step::Advance(ms) => time::sleep(Duration::from_millis(*ms)).await,
        }
        self.consume_finished();
        Ok(())
    }

    /// Record the outcome of a request.
    fn note_request(&self, handle: Option<TransitionHandle>) {
        match handle {
            Some(h) => self.note(format!("  submitted {h}")),
            None => self.note("  ignored".into()),
        }
    }

    /// Hand `pending` its geometry.
    fn deliver(&mut self, pending: &Pending) {
        let info = self.geometry(pending);
        let finished = self.finished.clone();
        let handle = pending.handle;
        self.last_delivered = Some(handle);
        let handled = self.shell.router().start_animation(
            handle,
            &info,
            SurfaceTransaction::new(),
            SurfaceTransaction::new(),
            Box::new(move |_| finished.lock().push(handle)),
        );
        if handled.is_none() {
            // Default handling: the transition plays out without PiP.
            self.note(format!("  {handle} not handled"));
            self.shell.router().on_transition_consumed(handle, false);
        }
    }

    /// Report finished transitions as consumed.
    fn consume_finished(&self) {
        let done: Vec<TransitionHandle> = self.finished.lock().drain(..).collect();
        for handle in done {
            debug!(%handle, "transition finished");
            self.note(format!("  finished {handle}"));
            self.shell.router().on_transition_consumed(handle, false);
        }
    }

    /// Ready geometry the window manager would report for `pending`.
    fn geometry(&self, pending: &Pending) -> TransitionInfo {
        let bounds = self.shell.bounds_state();
        let current = bounds.bounds();
        let token = self.task.token;
        let requested = match pending.txn.change_for(token).and_then(|c| c.bounds) {
            Some(BoundsUpdate::Set(r)) => r,
            _ => current,
        };
        let (start, end) = match pending.kind {
            TransitionType::EnterPip => (self.task.info.bounds, requested),
            TransitionType::ResizePip => (current, requested),
            TransitionType::ExitPip => (current, bounds.normal_bounds()),
            TransitionType::ExitPipToSplit => (
                current,
                Rect::new(0.0, 0.0, self.layout.width, self.layout.height / 2.0),
            ),
            TransitionType::RemovePip => (current, current),
        };
        TransitionInfo::new(pending.kind)
            .with_change(TransitionChange::new(token, LEASH, start, end))
    }

    /// Stop the pump and produce the report.
    pub async fn finish(mut self) -> Report {
        self.pump.shutdown().await;
        self.consume_finished();
        if self.transitions.pending_len() > 0 {
            self.note(format!(
                "  {} transition(s) still pending",
                self.transitions.pending_len()
            ));
        }
        let transcript = self.transcript.lock().clone();
        Report {
            transcript,
            final_state: self.shell.transition_state().state(),
            final_bounds: self.shell.bounds_state().bounds(),
            frames_applied: self.composer.applied(),
        }
    }
}

/// Run `scenario` to completion.
pub async fn run(
    config: Arc<PipConfig>,
    scenario: &Scenario,
    frame_interval: Duration,
) -> Result<Report> {
    let mut sim = Simulator::new(config, scenario, frame_interval);
    for (index, step) in scenario.steps.iter().enumerate() {
        if let Err(err) = sim.step(index, step).await {
            sim.pump.stop();
            return Err(err);
        }
    }
    let report = sim.finish().await;
    info!(state = %report.final_state, frames = report.frames_applied, "scenario finished");
    Ok(report)
}
