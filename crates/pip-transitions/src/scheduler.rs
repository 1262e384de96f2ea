//! The PiP request orchestrator.
//!
//! [`PipScheduler`] accepts enter, resize, remove and expand requests, checks
//! them against the [`TransitionState`](crate::TransitionState), builds the
//! hierarchy transaction and hands it to the transition manager. It is also
//! the executor for enter, resize and remove transitions once they are ready.
//!
//! Requests never fail loudly: a request with no legal target is a debug-level
//! no-op and returns `None`.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use pip_bounds::PipParams;
use pip_geom::{Matrix, Rect, Rotation};
use pip_ids::{SurfaceId, TransitionHandle};
use tracing::{debug, warn};

use crate::{
    AlphaAnimationSpec, AnimationHandle, AnimationId, Animator, AnimatorCallbacks,
    BoundsAnimationSpec, BoundsUpdate, CropSpec, Error, FinishCallback, HierarchyTransaction,
    InFlight, InteractionKind, PipContext, PipState, PipTask, Result, SplitPosition, StateExtra,
    SurfaceTransaction, TransitionInfo, TransitionKind, TransitionPhase, WindowingMode,
};

/// Supplies the current PiP parameters.
pub type ParamsSupplier = Arc<dyn Fn() -> PipParams + Send + Sync>;
/// Receives the movement bounds after a resize settles.
pub type MovementBoundsCallback = Arc<dyn Fn(Rect) + Send + Sync>;

/// Log a dropped request at a level matching its cause.
fn log_dropped(op: &'static str, err: &Error) {
    if err.is_programming_error() {
        warn!(op, %err, "pip request dropped");
    } else {
        debug!(op, %err, "pip request ignored");
    }
}

/// Milliseconds to a [`Duration`].
fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Scheduler state behind the shared handle.
struct Inner {
    /// Shared ledgers and collaborators.
    ctx: PipContext,
    /// Override for the current PiP parameters.
    params_supplier: Mutex<Option<ParamsSupplier>>,
    /// Movement-bounds observer.
    on_movement_bounds_changed: Mutex<Option<MovementBoundsCallback>>,
    /// Overlay fade-in started by a non-seamless resize.
    overlay: Mutex<Option<AnimationHandle>>,
}

/// Clonable handle to the PiP scheduler.
#[derive(Clone)]
pub struct PipScheduler {
    /// Shared scheduler state.
    inner: Arc<Inner>,
}

impl PipScheduler {
    /// Build a scheduler and subscribe it to state changes.
    ///
    /// The subscription holds only a weak reference, so dropping every
    /// scheduler handle silences it.
    pub fn new(ctx: PipContext) -> Self {
        let inner = Arc::new(Inner {
            ctx,
            params_supplier: Mutex::new(None),
            on_movement_bounds_changed: Mutex::new(None),
            overlay: Mutex::new(None),
        });
        let weak: Weak<Inner> = Arc::downgrade(&inner);
        inner
            .ctx
            .transition_state
            .add_listener(move |old, new, extra| {
                if let Some(inner) = weak.upgrade() {
                    Self { inner }.on_pip_transition_state_changed(old, new, extra);
                }
            });
        Self { inner }
    }

    /// Rebuild a handle from a weak reference held by a callback.
    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Weak reference for callbacks.
    fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    /// Shared context.
    pub fn context(&self) -> &PipContext {
        &self.inner.ctx
    }

    /// Replace the source of PiP parameters consulted after a resize.
    pub fn set_params_supplier(&self, supplier: impl Fn() -> PipParams + Send + Sync + 'static) {
        *self.inner.params_supplier.lock() = Some(Arc::new(supplier));
    }

    /// Register the movement-bounds observer.
    pub fn set_on_movement_bounds_changed(&self, f: impl Fn(Rect) + Send + Sync + 'static) {
        *self.inner.on_movement_bounds_changed.lock() = Some(Arc::new(f));
    }

    /// Current PiP parameters: the supplier's, else those the task entered
    /// with.
    pub fn params(&self) -> PipParams {
        let supplier = self.inner.params_supplier.lock().clone();
        match supplier {
            Some(f) => f(),
            None => self
                .inner
                .ctx
                .transition_state
                .pip_task()
                .map(|t| t.info.params)
                .unwrap_or_default(),
        }
    }

    /// True while a resize overlay fade is referenced.
    pub fn has_overlay_animator(&self) -> bool {
        self.inner.overlay.lock().is_some()
    }

    /// The task in PiP, or [`Error::NoPipTask`].
    fn require_task(&self) -> Result<PipTask> {
        self.inner
            .ctx
            .transition_state
            .pip_task()
            .ok_or(Error::NoPipTask)
    }

    /// The pinned leash, or [`Error::MissingLeash`].
    fn require_leash(&self) -> Result<SurfaceId> {
        self.inner
            .ctx
            .transition_state
            .pinned_leash()
            .ok_or(Error::MissingLeash)
    }

    /// Submit `txn` and track the returned handle.
    fn submit(&self, kind: TransitionKind, txn: HierarchyTransaction) -> TransitionHandle {
        let ctx = &self.inner.ctx;
        let destination = ctx
            .transition_state
            .pip_task_token()
            .and_then(|token| txn.change_for(token))
            .and_then(|change| match change.bounds {
                Some(BoundsUpdate::Set(bounds)) => Some(bounds),
                _ => None,
            });
        let handle = ctx
            .collab
            .transitions
            .start_transition(kind.transition_type(), txn);
        ctx.registry.insert(handle, kind, destination);
        debug!(%handle, ?kind, "pip transition submitted");
        handle
    }

    // ---- Requests ----

    /// Move `task` into PiP, animating `leash`.
    ///
    /// Refused while a PiP instance is live; the previous one must exit first.
    pub fn schedule_enter_pip(&self, task: PipTask, leash: SurfaceId) -> Option<TransitionHandle> {
        self.try_enter(task, leash)
            .inspect_err(|e| log_dropped("enter", e))
            .ok()
    }

    /// Body of [`Self::schedule_enter_pip`].
    fn try_enter(&self, task: PipTask, leash: SurfaceId) -> Result<TransitionHandle> {
        let ctx = &self.inner.ctx;
        let ts = &ctx.transition_state;
        let state = ts.state();
        if state.is_in_transition() {
            return Err(Error::TransitionBusy { state });
        }
        if state.is_in_pip() {
            return Err(Error::AlreadyInPip { state });
        }
        let params = task.info.params.clone();
        let token = task.token;
        let bs = &ctx.bounds_state;
        bs.set_last_owning_component(task.info.component.clone());
        bs.set_display_layout(ctx.collab.display.display_layout());
        ctx.algorithm.update_size_limits();
        bs.set_aspect_ratio(ctx.algorithm.aspect_ratio_for(&params));
        bs.set_normal_bounds(task.info.bounds);
        bs.set_has_user_resized(false);
        bs.set_has_user_moved(false);
        let destination = ctx.algorithm.entry_destination_bounds(&params);
        bs.clear_reentry_state();

        ts.set_pip_task(task);
        ts.set_pinned_leash(leash);

        let mut txn = HierarchyTransaction::new();
        txn.set_windowing_mode(token, WindowingMode::Pinned)
            .set_bounds(token, destination)
            .set_duration_ms(ctx.config.enter_duration_ms);
        ts.set_state(PipState::EnteringPip, StateExtra::None);
        Ok(self.submit(TransitionKind::Enter, txn))
    }

    /// Animate the PiP container to `bounds`.
    ///
    /// With `config_at_end` the container's configuration change is deferred
    /// until the transition ends. `duration_ms` defaults to the configured
    /// resize duration.
    pub fn schedule_animate_resize_pip(
        &self,
        bounds: Rect,
        config_at_end: bool,
        duration_ms: Option<u64>,
    ) -> Option<TransitionHandle> {
        self.try_animate_resize(bounds, config_at_end, duration_ms)
            .inspect_err(|e| log_dropped("animate-resize", e))
            .ok()
    }

    /// Body of [`Self::schedule_animate_resize_pip`].
    fn try_animate_resize(
        &self,
        bounds: Rect,
        config_at_end: bool,
        duration_ms: Option<u64>,
    ) -> Result<TransitionHandle> {
        let task = self.require_task()?;
        let ctx = &self.inner.ctx;
        let state = ctx.transition_state.state();
        if !state.is_in_pip() {
            return Err(Error::NotInPip { state });
        }
        if state.is_in_transition() {
            return Err(Error::TransitionBusy { state });
        }
        self.require_leash()?;
        let duration_ms = duration_ms.unwrap_or(ctx.config.resize_duration_ms);

        let mut txn = HierarchyTransaction::new();
        txn.set_bounds(task.token, bounds)
            .set_duration_ms(duration_ms);
        if config_at_end {
            txn.set_config_at_transition_end(task.token, true);
        }
        ctx.transition_state.set_state(
            PipState::ScheduledBoundsChange,
            StateExtra::BoundsChange {
                destination: bounds,
                duration_ms,
            },
        );
        Ok(self.submit(TransitionKind::Resize { duration_ms }, txn))
    }

    /// Live-drag resize: transform the leash straight to `bounds`, rotated by
    /// `rotation_degrees` about its centre, without a transition.
    pub fn schedule_user_resize_pip(&self, bounds: Rect, rotation_degrees: f32) {
        if let Err(e) = self.try_user_resize(bounds, rotation_degrees) {
            log_dropped("user-resize", &e);
        }
    }

    /// Body of [`Self::schedule_user_resize_pip`].
    fn try_user_resize(&self, bounds: Rect, rotation_degrees: f32) -> Result<()> {
        self.require_task()?;
        let leash = self.require_leash()?;
        if bounds.is_empty() {
            debug!(%bounds, "empty user resize ignored");
            return Ok(());
        }
        let ctx = &self.inner.ctx;
        let current = ctx.bounds_state.bounds();
        if current.is_empty() {
            debug!("no committed bounds to resize from");
            return Ok(());
        }
        let matrix = Matrix::scale(bounds.w / current.w, bounds.h / current.h)
            .post_translate(bounds.x, bounds.y)
            .post_rotate(rotation_degrees, bounds.cx(), bounds.cy());
        let mut txn = SurfaceTransaction::new();
        txn.set_matrix(leash, matrix);
        ctx.collab.composer.apply(txn);
        Ok(())
    }

    /// Commit settled `bounds`, notify the movement-bounds observer, and fade
    /// the overlay in when the resize was not seamless.
    pub fn schedule_finish_resize_pip(&self, bounds: Rect) {
        if let Err(e) = self.try_finish_resize(bounds) {
            log_dropped("finish-resize", &e);
        }
    }

    /// Body of [`Self::schedule_finish_resize_pip`].
    fn try_finish_resize(&self, bounds: Rect) -> Result<()> {
        self.require_task()?;
        let ctx = &self.inner.ctx;
        ctx.bounds_state.set_bounds(bounds);
        let movement = ctx.algorithm.movement_bounds();
        let observer = self.inner.on_movement_bounds_changed.lock().clone();
        if let Some(cb) = observer {
            cb(movement);
        }
        if self.params().seamless_resize {
            return Ok(());
        }
        let leash = self.require_leash()?;
        self.start_overlay_fade_in(leash);
        Ok(())
    }

    /// Start the overlay fade-in, ending any previous one.
    fn start_overlay_fade_in(&self, leash: SurfaceId) {
        let ctx = &self.inner.ctx;
        let id = AnimationId::next();
        let weak = self.downgrade();
        let callbacks = AnimatorCallbacks::new().on_end(move || {
            if let Some(inner) = weak.upgrade() {
                let mut g = inner.overlay.lock();
                if g.as_ref().is_some_and(|h| h.id() == id) {
                    *g = None;
                }
            }
        });
        let animator = ctx.collab.animators.alpha(
            AlphaAnimationSpec {
                leash,
                from: 0.0,
                to: 1.0,
                duration: ms(ctx.config.overlay_fade_duration_ms),
            },
            callbacks,
        );
        let handle = AnimationHandle::new(id, animator);
        let previous = self.inner.overlay.lock().replace(handle.clone());
        if let Some(previous) = previous {
            previous.end();
        }
        debug!(%id, "overlay fade-in");
        handle.start();
    }

    /// Dismiss PiP, optionally fading the leash out first.
    ///
    /// Ends any running PiP animation first.
    pub fn schedule_remove_pip(&self, with_fadeout: bool) -> Option<TransitionHandle> {
        self.try_remove(with_fadeout)
            .inspect_err(|e| log_dropped("remove", e))
            .ok()
    }

    /// Body of [`Self::schedule_remove_pip`].
    fn try_remove(&self, with_fadeout: bool) -> Result<TransitionHandle> {
        self.require_task()?;
        let ctx = &self.inner.ctx;
        let state = ctx.transition_state.state();
        if !state.is_in_pip() {
            return Err(Error::NotInPip { state });
        }
        self.require_leash()?;
        self.preempt();
        // Ending the preempted animation may have finished PiP outright.
        let task = self.require_task()?;

        let mut txn = HierarchyTransaction::new();
        txn.remove_task(task.token);
        ctx.transition_state
            .set_state(PipState::ExitingPip, StateExtra::None);
        Ok(self.submit(
            TransitionKind::Remove {
                fade_out: with_fadeout,
            },
            txn,
        ))
    }

    /// Expand PiP back to the task's normal bounds, or into split screen
    /// when the task's previous parent is hosted in a split stage.
    ///
    /// Saves the current snap fraction for re-entry and ends any running PiP
    /// animation first.
    pub fn schedule_exit_via_expand(&self) -> Option<TransitionHandle> {
        self.try_expand()
            .inspect_err(|e| log_dropped("expand", e))
            .ok()
    }

    /// Body of [`Self::schedule_exit_via_expand`].
    fn try_expand(&self) -> Result<TransitionHandle> {
        self.require_task()?;
        let ctx = &self.inner.ctx;
        let state = ctx.transition_state.state();
        if !state.is_in_pip() {
            return Err(Error::NotInPip { state });
        }
        if state == PipState::ExitingPip {
            return Err(Error::TransitionBusy { state });
        }
        self.require_leash()?;

        let fraction = ctx
            .algorithm
            .bounds_to_snap_fraction(&ctx.bounds_state.bounds());
        ctx.bounds_state.save_reentry_state(fraction);
        self.preempt();
        let task = self.require_task()?;
        ctx.transition_state
            .set_state(PipState::ExitingPip, StateExtra::None);

        let desktop = ctx
            .collab
            .desktop
            .as_ref()
            .is_some_and(|d| d.is_desktop_mode_active(task.info.display));
        let mode = if desktop {
            WindowingMode::Freeform
        } else {
            WindowingMode::Undefined
        };
        let mut txn = HierarchyTransaction::new();
        txn.clear_bounds(task.token)
            .set_windowing_mode(task.token, mode)
            .set_duration_ms(ctx.config.expand_duration_ms);

        let split = ctx.collab.split.as_ref().filter(|s| {
            task.info
                .last_parent_task
                .is_some_and(|id| s.is_task_in_split_screen(id))
        });
        let kind = match split {
            Some(split) => {
                split.prepare_enter_split_screen(&mut txn, &task.info, SplitPosition::Undefined);
                TransitionKind::ExpandToSplit
            }
            None => TransitionKind::Expand,
        };
        Ok(self.submit(kind, txn))
    }

    /// End the running animation and supersede transitions still waiting
    /// for geometry.
    fn preempt(&self) {
        let ctx = &self.inner.ctx;
        if let Some(old) = ctx.slot.end_current() {
            debug!(id = %old.id(), "preempted running pip animation");
        }
        ctx.registry.supersede_pending();
    }

    // ---- State observation ----

    /// React to a lifecycle change: a new exit or bounds change ends any
    /// overlay fade still running from an earlier resize.
    pub fn on_pip_transition_state_changed(&self, _old: PipState, new: PipState, _: &StateExtra) {
        if !matches!(new, PipState::ExitingPip | PipState::ScheduledBoundsChange) {
            return;
        }
        let overlay = self.inner.overlay.lock().take();
        if let Some(overlay) = overlay
            && overlay.is_started()
        {
            debug!(id = %overlay.id(), %new, "ending overlay fade");
            overlay.end();
        }
    }

    // ---- Executor ----

    /// Start the animation for a ready enter, resize or remove transition.
    pub(crate) fn start_animation(
        &self,
        handle: TransitionHandle,
        kind: TransitionKind,
        info: &TransitionInfo,
        start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Result<()> {
        match kind {
            TransitionKind::Enter => self.animate_enter(handle, info, start, finish, on_finished),
            TransitionKind::Resize { duration_ms } => {
                self.animate_resize(handle, duration_ms, info, start, finish, on_finished)
            }
            TransitionKind::Remove { fade_out } => {
                self.animate_remove(handle, fade_out, start, finish, on_finished)
            }
            TransitionKind::Expand | TransitionKind::ExpandToSplit => {
                Err(Error::UnknownTransition(handle))
            }
        }
    }

    /// Install `animator` under `id` as the only running animation and start it.
    fn install(&self, id: AnimationId, animator: Arc<dyn Animator>) {
        let handle = AnimationHandle::new(id, animator);
        self.inner.ctx.slot.replace_and_cancel(handle.clone());
        handle.start();
    }

    /// Executor for [`TransitionKind::Enter`].
    fn animate_enter(
        &self,
        handle: TransitionHandle,
        info: &TransitionInfo,
        mut start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Result<()> {
        let task = self.require_task()?;
        let leash = self.require_leash()?;
        let change = info
            .find_change(task.token)
            .ok_or(Error::ChangeNotFound { token: task.token })?;
        let ctx = &self.inner.ctx;
        let (from, to) = (change.start_abs_bounds, change.end_abs_bounds);
        let crop = ctx
            .algorithm
            .valid_source_hint_rect(&self.params(), &from, &to)
            .map(|hint| CropSpec {
                from: Rect::new(0.0, 0.0, from.w, from.h),
                to: hint.relative_to(&from),
            });
        start.show(leash);
        ctx.collab.composer.apply(start);

        let id = AnimationId::next();
        let latency = ctx.collab.latency.clone();
        let weak = self.downgrade();
        let callbacks = AnimatorCallbacks::new()
            .on_start(move || latency.begin(leash, InteractionKind::PipEnter))
            .on_end(move || {
                if let Some(s) = Self::upgrade(&weak) {
                    s.finish_enter(handle, id, to, finish, on_finished);
                }
            });
        let animator = ctx.collab.animators.bounds(
            BoundsAnimationSpec {
                leash,
                start: from,
                end: to,
                crop,
                rotation: Rotation::R0,
                duration: ms(ctx.config.enter_duration_ms),
            },
            callbacks,
        );
        self.install(id, animator);
        Ok(())
    }

    /// End of the enter animation.
    fn finish_enter(
        &self,
        handle: TransitionHandle,
        id: AnimationId,
        bounds: Rect,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) {
        let ctx = &self.inner.ctx;
        ctx.collab.latency.end(InteractionKind::PipEnter);
        ctx.slot.clear_if(id);
        ctx.registry.set_phase(handle, TransitionPhase::Finalizing);
        ctx.bounds_state.set_bounds(bounds);
        ctx.collab.composer.apply(finish);
        on_finished(None);
        ctx.transition_state
            .set_state(PipState::EnteredPip, StateExtra::None);
        ctx.registry.set_phase(handle, TransitionPhase::Done);
    }

    /// Executor for [`TransitionKind::Resize`].
    fn animate_resize(
        &self,
        handle: TransitionHandle,
        duration_ms: u64,
        info: &TransitionInfo,
        start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Result<()> {
        let task = self.require_task()?;
        let leash = self.require_leash()?;
        let change = info
            .find_change(task.token)
            .ok_or(Error::ChangeNotFound { token: task.token })?;
        let ctx = &self.inner.ctx;
        let (from, to) = (change.start_abs_bounds, change.end_abs_bounds);
        ctx.collab.composer.apply(start);

        let id = AnimationId::next();
        let latency = ctx.collab.latency.clone();
        let weak = self.downgrade();
        let callbacks = AnimatorCallbacks::new()
            .on_start(move || latency.begin(leash, InteractionKind::PipResize))
            .on_end(move || {
                if let Some(s) = Self::upgrade(&weak) {
                    s.finish_resize_transition(handle, id, to, finish, on_finished);
                }
            });
        let animator = ctx.collab.animators.bounds(
            BoundsAnimationSpec {
                leash,
                start: from,
                end: to,
                crop: None,
                rotation: Rotation::R0,
                duration: ms(duration_ms),
            },
            callbacks,
        );
        self.install(id, animator);
        Ok(())
    }

    /// End of the resize animation.
    fn finish_resize_transition(
        &self,
        handle: TransitionHandle,
        id: AnimationId,
        bounds: Rect,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) {
        let ctx = &self.inner.ctx;
        ctx.collab.latency.end(InteractionKind::PipResize);
        ctx.slot.clear_if(id);
        ctx.registry.set_phase(handle, TransitionPhase::Finalizing);
        ctx.collab.composer.apply(finish);
        on_finished(None);
        self.schedule_finish_resize_pip(bounds);
        ctx.transition_state
            .set_state(PipState::EnteredPip, StateExtra::None);
        ctx.registry.set_phase(handle, TransitionPhase::Done);
    }

    /// Executor for [`TransitionKind::Remove`].
    fn animate_remove(
        &self,
        handle: TransitionHandle,
        fade_out: bool,
        start: SurfaceTransaction,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) -> Result<()> {
        self.require_task()?;
        let leash = self.require_leash()?;
        let ctx = &self.inner.ctx;
        ctx.collab.composer.apply(start);
        if !fade_out {
            self.finish_remove(handle, None, finish, on_finished);
            return Ok(());
        }
        let id = AnimationId::next();
        let weak = self.downgrade();
        let callbacks = AnimatorCallbacks::new().on_end(move || {
            if let Some(s) = Self::upgrade(&weak) {
                s.finish_remove(handle, Some(id), finish, on_finished);
            }
        });
        let animator = ctx.collab.animators.alpha(
            AlphaAnimationSpec {
                leash,
                from: 1.0,
                to: 0.0,
                duration: ms(ctx.config.remove_fade_duration_ms),
            },
            callbacks,
        );
        self.install(id, animator);
        Ok(())
    }

    /// End of the remove transition.
    fn finish_remove(
        &self,
        handle: TransitionHandle,
        id: Option<AnimationId>,
        finish: SurfaceTransaction,
        on_finished: FinishCallback,
    ) {
        let ctx = &self.inner.ctx;
        if let Some(id) = id {
            ctx.slot.clear_if(id);
        }
        ctx.registry.set_phase(handle, TransitionPhase::Finalizing);
        ctx.collab.composer.apply(finish);
        on_finished(None);
        ctx.transition_state
            .set_state(PipState::ExitedPip, StateExtra::None);
        ctx.transition_state.clear_pip_task();
        ctx.registry.set_phase(handle, TransitionPhase::Done);
    }

    /// Fold a newer transition into the running one by ending it.
    pub(crate) fn merge_animation(&self) {
        self.inner.ctx.slot.end_current();
    }

    /// The transition manager is done with `handle`.
    ///
    /// A transition that never started animating either ran as the
    /// transition manager's default, unanimated transition, which lands the
    /// lifecycle in its terminal state, or was aborted, which rolls the
    /// lifecycle back to the state before it was submitted. An aborted
    /// transition that was animating is ended so its normal completion runs.
    pub fn on_transition_consumed(&self, handle: TransitionHandle, aborted: bool) {
        let ctx = &self.inner.ctx;
        let Some(entry) = ctx.registry.remove(handle) else {
            debug!(%handle, "consumed unknown transition");
            return;
        };
        match entry.phase {
            TransitionPhase::Submitted if !entry.superseded => {
                if aborted {
                    self.roll_back(handle, entry);
                } else {
                    self.settle_unanimated(handle, entry);
                }
            }
            TransitionPhase::Animating if aborted => {
                ctx.slot.end_current();
            }
            _ => {}
        }
    }

    /// True when the lifecycle is still in the state `entry` set on submit.
    fn owns_state(&self, handle: TransitionHandle, entry: &InFlight) -> bool {
        let state = self.inner.ctx.transition_state.state();
        let owned = state == entry.kind.in_flight_state();
        if !owned {
            debug!(%handle, %state, "consumed transition no longer owns the state");
        }
        owned
    }

    /// Land `entry` where its default transition left the container.
    fn settle_unanimated(&self, handle: TransitionHandle, entry: InFlight) {
        if !self.owns_state(handle, &entry) {
            return;
        }
        let ctx = &self.inner.ctx;
        let ts = &ctx.transition_state;
        debug!(%handle, kind = ?entry.kind, "transition ran without pip animation");
        match entry.kind {
            TransitionKind::Enter | TransitionKind::Resize { .. } => {
                if let Some(bounds) = entry.destination {
                    ctx.bounds_state.set_bounds(bounds);
                }
                ts.set_state(PipState::EnteredPip, StateExtra::None);
            }
            TransitionKind::Remove { .. }
            | TransitionKind::Expand
            | TransitionKind::ExpandToSplit => {
                ts.set_state(PipState::ExitedPip, StateExtra::None);
                ts.clear_pip_task();
            }
        }
    }

    /// Undo the state write made when `entry` was submitted.
    fn roll_back(&self, handle: TransitionHandle, entry: InFlight) {
        if !self.owns_state(handle, &entry) {
            return;
        }
        let ts = &self.inner.ctx.transition_state;
        let restored = match entry.kind {
            TransitionKind::Enter => PipState::ExitedPip,
            TransitionKind::Resize { .. }
            | TransitionKind::Remove { .. }
            | TransitionKind::Expand
            | TransitionKind::ExpandToSplit => PipState::EnteredPip,
        };
        warn!(%handle, kind = ?entry.kind, %restored, "transition aborted; rolling back");
        ts.set_state(restored, StateExtra::Aborted);
        if entry.kind == TransitionKind::Enter {
            ts.clear_pip_task();
        }
    }
}
