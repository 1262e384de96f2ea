//! Animators and the single in-flight animation slot.
//!
//! Only one animator may drive the pinned leash at a time. The
//! [`AnimationSlot`] is the sole owner of the running animator and ends the
//! previous one, running its end callbacks, before a new one is installed.

mod frame;

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use pip_geom::{Rect, Rotation};
use pip_ids::SurfaceId;
use tracing::trace;

pub use frame::{FrameAnimator, FrameAnimatorFactory, FrameClock, alpha_frame, bounds_frame};

/// One-shot animator lifecycle callback.
pub type AnimatorCallback = Box<dyn FnOnce() + Send>;

/// Start and end callbacks handed to an animator at construction.
#[derive(Default)]
pub struct AnimatorCallbacks {
    /// Runs once when the animator starts.
    on_start: Option<AnimatorCallback>,
    /// Runs once when the animator ends, unless it is cancelled.
    on_end: Option<AnimatorCallback>,
}

impl AnimatorCallbacks {
    /// No callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style start callback.
    #[must_use]
    pub fn on_start(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Builder-style end callback.
    #[must_use]
    pub fn on_end(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Take the start callback, leaving `None`.
    pub fn take_start(&mut self) -> Option<AnimatorCallback> {
        self.on_start.take()
    }

    /// Take the end callback, leaving `None`.
    pub fn take_end(&mut self) -> Option<AnimatorCallback> {
        self.on_end.take()
    }
}

/// A surface animator.
pub trait Animator: Send + Sync {
    /// Begin animating; runs the start callback.
    fn start(&self);
    /// Jump to the final value and run the end callback. Starts the animator
    /// first when it was never started; no-op once ended or cancelled.
    fn end(&self);
    /// Stop where it is without running the end callback.
    fn cancel(&self);
    /// True between `start` and the end of the animation.
    fn is_started(&self) -> bool;
    /// True while frames are still being produced.
    fn is_running(&self) -> bool;
}

/// Crop interpolation in surface-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropSpec {
    /// Crop at the first frame.
    pub from: Rect,
    /// Crop at the last frame.
    pub to: Rect,
}

/// Parameters of a bounds animation on a leash.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundsAnimationSpec {
    /// Surface being animated.
    pub leash: SurfaceId,
    /// Bounds at the first frame.
    pub start: Rect,
    /// Bounds at the last frame.
    pub end: Rect,
    /// Source-hint crop, when the content occupies a sub-region.
    pub crop: Option<CropSpec>,
    /// Rotation reached at the last frame.
    pub rotation: Rotation,
    /// Total duration.
    pub duration: Duration,
}

/// Parameters of an alpha animation on a leash.
#[derive(Clone, Debug, PartialEq)]
pub struct AlphaAnimationSpec {
    /// Surface being faded.
    pub leash: SurfaceId,
    /// Opacity at the first frame.
    pub from: f32,
    /// Opacity at the last frame.
    pub to: f32,
    /// Total duration.
    pub duration: Duration,
}

/// Builds animators for the executors.
pub trait AnimatorFactory: Send + Sync {
    /// An animator moving and scaling a leash between two rectangles.
    fn bounds(&self, spec: BoundsAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator>;
    /// An animator fading a leash.
    fn alpha(&self, spec: AlphaAnimationSpec, callbacks: AnimatorCallbacks) -> Arc<dyn Animator>;
}

/// Source of animation ids.
static NEXT_ANIMATION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an installed animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationId(u64);

impl AnimationId {
    /// A fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_ANIMATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim#{}", self.0)
    }
}

/// A running animator plus its identity.
#[derive(Clone)]
pub struct AnimationHandle {
    /// Identity used by end callbacks to clear their own slot entry.
    id: AnimationId,
    /// The animator.
    animator: Arc<dyn Animator>,
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.id)
            .field("started", &self.animator.is_started())
            .finish()
    }
}

impl AnimationHandle {
    /// Wrap `animator` under a pre-allocated `id`.
    pub fn new(id: AnimationId, animator: Arc<dyn Animator>) -> Self {
        Self { id, animator }
    }

    /// Identity.
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// The wrapped animator.
    pub fn animator(&self) -> &Arc<dyn Animator> {
        &self.animator
    }

    /// See [`Animator::start`].
    pub fn start(&self) {
        self.animator.start();
    }

    /// See [`Animator::end`].
    pub fn end(&self) {
        self.animator.end();
    }

    /// See [`Animator::is_started`].
    pub fn is_started(&self) -> bool {
        self.animator.is_started()
    }
}

/// Holder of the single in-flight animation on the pinned leash.
///
/// Cloning shares the slot. The slot lock is never held while an animator
/// runs callbacks, so end callbacks may freely touch the slot again.
#[derive(Clone, Default)]
pub struct AnimationSlot {
    /// The installed animation.
    current: Arc<Mutex<Option<AnimationHandle>>>,
}

impl AnimationSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// End whatever is installed, then install `new`. Returns the animation
    /// that was displaced, already ended.
    ///
    /// An end callback that installs another animation while being displaced
    /// gets that animation ended too, so `new` is always installed into an
    /// empty slot.
    pub fn replace_and_cancel(&self, new: AnimationHandle) -> Option<AnimationHandle> {
        let mut displaced = None;
        loop {
            let old = {
                let mut g = self.current.lock();
                match g.take() {
                    Some(old) => old,
                    None => {
                        *g = Some(new);
                        return displaced;
                    }
                }
            };
            trace!(old = %old.id, "ending displaced animation");
            old.end();
            displaced.get_or_insert(old);
        }
    }

    /// End and remove the installed animation, if any.
    pub fn end_current(&self) -> Option<AnimationHandle> {
        let old = self.current.lock().take();
        if let Some(old) = &old {
            trace!(id = %old.id, "ending current animation");
            old.end();
        }
        old
    }

    /// Remove the installed animation if it is `id`, without ending it.
    pub fn clear_if(&self, id: AnimationId) -> bool {
        let mut g = self.current.lock();
        if g.as_ref().is_some_and(|h| h.id == id) {
            *g = None;
            true
        } else {
            false
        }
    }

    /// Id of the installed animation.
    pub fn current_id(&self) -> Option<AnimationId> {
        self.current.lock().as_ref().map(|h| h.id)
    }

    /// True when nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.current.lock().is_none()
    }
}
