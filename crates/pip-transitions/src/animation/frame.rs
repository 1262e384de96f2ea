//! Clock-driven default animators.
//!
//! A [`FrameAnimator`] produces frames only when its [`FrameClock`] is
//! ticked, so hosts decide the frame cadence and tests can step time
//! deterministically.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::Mutex;
use pip_geom::{Matrix, Rect, lerp, lerp_rect};
use tracing::trace;

use super::{
    AlphaAnimationSpec, Animator, AnimatorCallbacks, AnimatorFactory, BoundsAnimationSpec,
};
use crate::{SurfaceComposer, SurfaceTransaction};

/// Per-frame update receiving the animation fraction in `[0, 1]`.
type FrameFn = Box<dyn FnMut(f32) + Send>;

/// Shared frame source for [`FrameAnimator`]s.
#[derive(Clone, Default)]
pub struct FrameClock {
    /// Animators that still produce frames.
    running: Arc<Mutex<Vec<Arc<FrameAnimator>>>>,
}

impl FrameClock {
    /// A clock with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a started animator.
    fn register(&self, animator: Arc<FrameAnimator>) {
        self.running.lock().push(animator);
    }

    /// Advance every running animator by `dt`. Returns how many animators
    /// were advanced.
    pub fn tick(&self, dt: Duration) -> usize {
        let live: Vec<Arc<FrameAnimator>> = self.running.lock().clone();
        for animator in &live {
            animator.advance(dt);
        }
        self.running.lock().retain(|a| a.is_running());
        live.len()
    }

    /// True while any animator still needs frames.
    pub fn has_running(&self) -> bool {
        self.running.lock().iter().any(|a| a.is_running())
    }
}

/// Lifecycle flags of a [`FrameAnimator`].
#[derive(Default)]
struct Progress {
    /// `start` has been called.
    started: bool,
    /// Producing frames.
    running: bool,
    /// Ended or cancelled.
    finished: bool,
    /// Time accumulated from clock ticks.
    elapsed: Duration,
}

/// Linear animator advanced by a [`FrameClock`].
pub struct FrameAnimator {
    /// Self reference used to register with the clock.
    me: Weak<Self>,
    /// Clock supplying frames.
    clock: FrameClock,
    /// Total duration.
    duration: Duration,
    /// Frame writer.
    frame: Mutex<FrameFn>,
    /// Lifecycle flags.
    progress: Mutex<Progress>,
    /// Pending callbacks.
    callbacks: Mutex<AnimatorCallbacks>,
}

impl FrameAnimator {
    /// Build an animator that calls `frame` with the fraction on each tick.
    pub fn new(
        clock: FrameClock,
        duration: Duration,
        frame: impl FnMut(f32) + Send + 'static,
        callbacks: AnimatorCallbacks,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            clock,
            duration,
            frame: Mutex::new(Box::new(frame)),
            progress: Mutex::new(Progress::default()),
            callbacks: Mutex::new(callbacks),
        })
    }

    /// Step by `dt`, finishing when the duration is reached.
    fn advance(&self, dt: Duration) {
        let fraction = {
            let mut p = self.progress.lock();
            if !p.running {
                return;
            }
            p.elapsed += dt;
            if p.elapsed >= self.duration {
                None
            } else {
                Some(p.elapsed.as_secs_f32() / self.duration.as_secs_f32())
            }
        };
        match fraction {
            Some(t) => (self.frame.lock())(t),
            None => self.finish(),
        }
    }

    /// Write the last frame and run the end callback once.
    fn finish(&self) {
        {
            let mut p = self.progress.lock();
            if p.finished {
                return;
            }
            p.running = false;
            p.finished = true;
        }
        (self.frame.lock())(1.0);
        let on_end = self.callbacks.lock().take_end();
        if let Some(cb) = on_end {
            cb();
        }
    }
}

impl Animator for FrameAnimator {
    fn start(&self) {
        {
            let mut p = self.progress.lock();
            if p.started || p.finished {
                return;
            }
            p.started = true;
            p.running = true;
        }
        trace!(duration_ms = self.duration.as_millis(), "frame animator start");
        let on_start = self.callbacks.lock().take_start();
        if let Some(cb) = on_start {
            cb();
        }
        (self.frame.lock())(0.0);
        if self.duration.is_zero() {
            self.finish();
        } else if let Some(me) = self.me.upgrade() {
            self.clock.register(me);
        }
    }

    fn end(&self) {
        let never_started = {
            let p = self.progress.lock();
            if p.finished {
                return;
            }
            !p.started
        };
        if never_started {
            self.start();
        }
        self.finish();
    }

    fn cancel(&self) {
        {
            let mut p = self.progress.lock();
            if p.finished {
                return;
            }
            p.running = false;
            p.finished = true;
        }
        drop(self.callbacks.lock().take_end());
    }

    fn is_started(&self) -> bool {
        let p = self.progress.lock();
        p.started && !p.finished
    }

    fn is_running(&self) -> bool {
        self.progress.lock().running
    }
}

/// Ratio guarded against empty extents.
fn scale(to: f64, from: f64) -> f64 {
    if from <= 0.0 { 1.0 } else { to / from }
}

/// Surface transaction for fraction `t` of a bounds animation.
pub fn bounds_frame(spec: &BoundsAnimationSpec, t: f32) -> SurfaceTransaction {
    let rect = lerp_rect(&spec.start, &spec.end, f64::from(t));
    let degrees = spec.rotation.degrees() * t;
    let mut txn = SurfaceTransaction::new();
    match spec.crop {
        Some(c) => {
            let crop = lerp_rect(&c.from, &c.to, f64::from(t));
            let sx = scale(rect.w, crop.w);
            let sy = scale(rect.h, crop.h);
            let matrix = Matrix::scale(sx, sy)
                .post_translate(rect.x - crop.x * sx, rect.y - crop.y * sy)
                .post_rotate(degrees, rect.cx(), rect.cy());
            txn.set_matrix(spec.leash, matrix)
                .set_crop(spec.leash, Some(crop));
        }
        None => {
            let matrix = Matrix::identity()
                .post_translate(rect.x, rect.y)
                .post_rotate(degrees, rect.cx(), rect.cy());
            txn.set_matrix(spec.leash, matrix)
                .set_crop(spec.leash, Some(Rect::new(0.0, 0.0, rect.w, rect.h)));
        }
    }
    txn
}

/// Surface transaction for fraction `t` of an alpha animation.
pub fn alpha_frame(spec: &AlphaAnimationSpec, t: f32) -> SurfaceTransaction {
    let alpha = lerp(f64::from(spec.from), f64::from(spec.to), f64::from(t)) as f32;
    let mut txn = SurfaceTransaction::new();
    txn.set_alpha(spec.leash, alpha);
    txn
}

/// [`AnimatorFactory`] producing [`FrameAnimator`]s that write each frame to
/// a [`SurfaceComposer`].
#[derive(Clone)]
pub struct FrameAnimatorFactory {
    /// Clock the animators register with.
    clock: FrameClock,
    /// Destination for frames.
    composer: Arc<dyn SurfaceComposer>,
}

impl FrameAnimatorFactory {
    /// Factory driving animators from `clock` into `composer`.
    pub fn new(clock: FrameClock, composer: Arc<dyn SurfaceComposer>) -> Self {
        Self { clock, composer }
    }

    /// The clock animators are registered with.
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}

impl AnimatorFactory for FrameAnimatorFactory {
    fn bounds(&self, spec: BoundsAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator> {
        let composer = self.composer.clone();
        let duration = spec.duration;
        FrameAnimator::new(
            self.clock.clone(),
            duration,
            move |t| composer.apply(bounds_frame(&spec, t)),
            callbacks,
        )
    }

    fn alpha(&self, spec: AlphaAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator> {
        let composer = self.composer.clone();
        let duration = spec.duration;
        FrameAnimator::new(
            self.clock.clone(),
            duration,
            move |t| composer.apply(alpha_frame(&spec, t)),
            callbacks,
        )
    }
}
