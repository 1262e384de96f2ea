//! Executor for expand and expand-to-split transitions.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use pip_geom::{Rect, Rotation, rotate_bounds};
use pip_ids::{SurfaceId, TransitionHandle};
use tracing::debug;

use crate::{
    AnimationHandle, AnimationId, AnimatorCallbacks, BoundsAnimationSpec, CropSpec, Error,
    FinishCallback, InteractionKind, PipContext, PipState, Result, StateExtra, SurfaceTransaction,
    TransitionInfo, TransitionPhase,
};

/// Expand handler state.
struct Inner {
    /// Shared ledgers and collaborators.
    ctx: PipContext,
    /// Animation this handler installed and has not seen end.
    active: Mutex<Option<AnimationId>>,
}

/// Runs the expand-out animation once the transition manager reports real
/// geometry.
///
/// Idle until [`ExpandHandler::start_animation`] installs an animator, and
/// idle again once that animator ends, naturally or through
/// [`ExpandHandler::end`].
#[derive(Clone)]
pub struct ExpandHandler {
    /// Shared handler state.
    inner: Arc<Inner>,
}

impl ExpandHandler {
    /// Build a handler sharing `ctx` with the scheduler.
    pub fn new(ctx: PipContext) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                active: Mutex::new(None),
            }),
        }
    }

    /// True while this handler's animator is running.
    pub fn is_animating(&self) -> bool {
        let active = *self.inner.active.lock();
        active.is_some() && active == self.inner.ctx.slot.current_id()
    }

    /// Animate the expand for `handle`.
    pub fn start_animation(
        &self,
        handle: TransitionHandle,
        to_split: bool,
        info: &TransitionInfo,
        mut start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Result<()> {
        let ctx = &self.inner.ctx;
        let task = ctx
            .transition_state
            .pip_task()
            .ok_or(Error::NoPipTask)?;
        let change = info
            .find_change(task.token)
            .ok_or(Error::ChangeNotFound { token: task.token })?;
        let leash = change.leash;
        let from = change.start_abs_bounds;
        let mut to = change.end_abs_bounds;

        let crop = ctx
            .algorithm
            .valid_source_hint_rect(&task.info.params, &to, &from)
            .map(|hint| CropSpec {
                from: hint.relative_to(&to),
                to: Rect::new(0.0, 0.0, to.w, to.h),
            });

        // The destination may be laid out in a fixed rotation that the
        // display has not reached yet. Express the end bounds in the current
        // rotation and let the animator rotate the rest of the way.
        let layout = ctx.bounds_state.display_layout();
        let mut rotation = Rotation::R0;
        if let Some(fixed) = change.end_fixed_rotation {
            rotation = Rotation::delta(layout.rotation, fixed);
            if rotation != Rotation::R0 {
                let dest = layout.rotated_to(fixed);
                to = rotate_bounds(
                    &to,
                    dest.width,
                    dest.height,
                    Rotation::delta(fixed, layout.rotation),
                );
                debug!(?rotation, %to, "expand end bounds remapped for fixed rotation");
            }
        }

        let interaction = if to_split {
            InteractionKind::PipExpandToSplit
        } else {
            InteractionKind::PipExpand
        };
        start.show(leash);
        ctx.collab.composer.apply(start);

        let id = AnimationId::next();
        let latency = ctx.collab.latency.clone();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let callbacks = AnimatorCallbacks::new()
            .on_start(move || latency.begin(leash, interaction))
            .on_end(move || {
                if let Some(inner) = weak.upgrade() {
                    Self { inner }.finish(handle, id, to_split, leash, finish, on_finished);
                }
            });
        let animator = ctx.collab.animators.bounds(
            BoundsAnimationSpec {
                leash,
                start: from,
                end: to,
                crop,
                rotation,
                duration: Duration::from_millis(ctx.config.expand_duration_ms),
            },
            callbacks,
        );
        let anim = AnimationHandle::new(id, animator);
        ctx.slot.replace_and_cancel(anim.clone());
        *self.inner.active.lock() = Some(id);
        anim.start();
        Ok(())
    }

    /// End of the expand animation.
    fn finish(
        &self,
        handle: TransitionHandle,
        id: AnimationId,
        to_split: bool,
        leash: SurfaceId,
        mut finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) {
        let ctx = &self.inner.ctx;
        ctx.collab.latency.end(if to_split {
            InteractionKind::PipExpandToSplit
        } else {
            InteractionKind::PipExpand
        });
        ctx.slot.clear_if(id);
        {
            let mut active = self.inner.active.lock();
            if *active == Some(id) {
                *active = None;
            }
        }
        ctx.registry.set_phase(handle, TransitionPhase::Finalizing);
        finish.set_crop(leash, None);
        if to_split && let Some(split) = &ctx.collab.split {
            split.finish_enter_split_screen(&mut finish);
        }
        ctx.collab.composer.apply(finish);
        on_finished(None);
        ctx.transition_state
            .set_state(PipState::ExitedPip, StateExtra::None);
        ctx.transition_state.clear_pip_task();
        ctx.registry.set_phase(handle, TransitionPhase::Done);
    }

    /// A newer transition was merged into the expand: jump to the end.
    pub fn merge_animation(&self) {
        self.end();
    }

    /// End the running expand animation; no-op when idle.
    pub fn end(&self) {
        if self.is_animating() {
            self.inner.ctx.slot.end_current();
        }
    }
}
