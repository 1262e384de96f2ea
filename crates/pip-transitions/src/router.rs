//! Single entry point for transition-manager callbacks.

use pip_ids::TransitionHandle;
use tracing::{debug, warn};

use crate::{
    Error, ExpandHandler, FinishCallback, PipContext, PipScheduler, SurfaceTransaction,
    TransitionInfo, TransitionKind, TransitionPhase,
};

/// Marker returned when a callback was taken over by a PiP executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handled;

/// Dispatches ready, merge and consumed callbacks to the executor that owns
/// the transition's [`TransitionKind`].
///
/// `None` means the transition is not PiP's to animate (unknown handle, or a
/// geometry mismatch logged as a warning); the transition manager should
/// fall back to its default handling.
#[derive(Clone)]
pub struct PipTransitionRouter {
    /// Shared ledgers and collaborators.
    ctx: PipContext,
    /// Executor for enter, resize and remove.
    scheduler: PipScheduler,
    /// Executor for expand and expand-to-split.
    expand: ExpandHandler,
}

impl PipTransitionRouter {
    /// Route between `scheduler` and `expand`.
    pub fn new(ctx: PipContext, scheduler: PipScheduler, expand: ExpandHandler) -> Self {
        Self {
            ctx,
            scheduler,
            expand,
        }
    }

    /// Geometry for `handle` is ready: start its animation.
    pub fn start_animation(
        &self,
        handle: TransitionHandle,
        info: &TransitionInfo,
        start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Option<Handled> {
        let registry = &self.ctx.registry;
        let Some(entry) = registry.get(handle) else {
            debug!(%handle, "not a pip transition");
            return None;
        };
        if entry.phase != TransitionPhase::Submitted {
            warn!(%handle, phase = %entry.phase, "transition delivered twice");
            return None;
        }
        if entry.superseded {
            debug!(%handle, kind = ?entry.kind, "completing superseded transition without animation");
            let composer = &self.ctx.collab.composer;
            composer.apply(start);
            composer.apply(finish);
            on_finished(None);
            registry.set_phase(handle, TransitionPhase::Done);
            return Some(Handled);
        }

        registry.set_phase(handle, TransitionPhase::Animating);
        let result = match entry.kind {
            TransitionKind::Expand => {
                self.expand
                    .start_animation(handle, false, info, start, finish, on_finished)
            }
            TransitionKind::ExpandToSplit => {
                self.expand
                    .start_animation(handle, true, info, start, finish, on_finished)
            }
            kind => self
                .scheduler
                .start_animation(handle, kind, info, start, finish, on_finished),
        };
        match result {
            Ok(()) => Some(Handled),
            Err(err) => {
                registry.set_phase(handle, TransitionPhase::Submitted);
                log_unhandled(handle, &err);
                None
            }
        }
    }

    /// `merge_target` absorbed a newer transition: end its animation.
    ///
    /// Only a target that is still animating owns the slot; merges into
    /// anything else are declined.
    pub fn merge_animation(&self, merge_target: TransitionHandle) -> Option<Handled> {
        let entry = self.ctx.registry.get(merge_target)?;
        if entry.phase != TransitionPhase::Animating {
            debug!(%merge_target, phase = %entry.phase, "merge target is not animating");
            return None;
        }
        let kind = entry.kind;
        debug!(%merge_target, ?kind, "merging into pip transition");
        if kind.is_expand() {
            self.expand.merge_animation();
        } else {
            self.scheduler.merge_animation();
        }
        Some(Handled)
    }

    /// The transition manager finished with `handle`; `aborted` when it was
    /// dropped without running.
    pub fn on_transition_consumed(&self, handle: TransitionHandle, aborted: bool) {
        self.scheduler.on_transition_consumed(handle, aborted);
    }
}

/// Log why a ready transition was declined.
fn log_unhandled(handle: TransitionHandle, err: &Error) {
    if err.is_programming_error() {
        warn!(%handle, %err, "pip could not start transition");
    } else {
        debug!(%handle, %err, "pip declined transition");
    }
}
