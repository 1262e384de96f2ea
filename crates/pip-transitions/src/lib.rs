//! Picture-in-picture transition scheduling.
//!
//! The crate serialises PiP requests (enter, resize, remove, expand) against
//! a single lifecycle ledger and drives at most one animator on the pinned
//! leash at a time.
//!
//! - [`TransitionState`]: the lifecycle ledger and its observers.
//! - [`PipScheduler`]: request entry point and executor for enter, resize
//!   and remove.
//! - [`ExpandHandler`]: executor for expand and expand-to-split.
//! - [`PipTransitionRouter`]: dispatch of transition-manager callbacks by
//!   [`TransitionKind`].
//! - [`PipShell`]: composition root wiring the above to [`Collaborators`].
//!
//! Every component is a clonable handle. Locks are never held across calls
//! into collaborators, listeners or animators, so callbacks may re-enter the
//! scheduler synchronously.
#![warn(missing_docs)]

mod animation;
mod collab;
mod context;
mod error;
mod expand;
mod registry;
mod router;
mod scheduler;
mod shell;
mod state;
mod transaction;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use animation::{
    AlphaAnimationSpec, AnimationHandle, AnimationId, AnimationSlot, Animator, AnimatorCallback,
    AnimatorCallbacks, AnimatorFactory, BoundsAnimationSpec, CropSpec, FrameAnimator,
    FrameAnimatorFactory, FrameClock, alpha_frame, bounds_frame,
};
pub use collab::{
    Collaborators, DesktopWindowing, DisplayLayoutProvider, InteractionKind, LatencyTracker,
    SplitPosition, SplitScreen, SurfaceComposer, TransitionManager,
};
pub use context::PipContext;
pub use error::{Error, Result};
pub use expand::ExpandHandler;
pub use registry::{InFlight, TransitionKind, TransitionPhase, TransitionRegistry};
pub use router::{Handled, PipTransitionRouter};
pub use scheduler::{MovementBoundsCallback, ParamsSupplier, PipScheduler};
pub use shell::PipShell;
pub use state::{ListenerId, PipState, PipTask, StateExtra, StateListener, TaskInfo, TransitionState};
pub use transaction::{
    BoundsUpdate, FinishCallback, HierarchyChange, HierarchyTransaction, SurfaceOp,
    SurfaceTransaction, TransitionChange, TransitionInfo, TransitionType, WindowingMode,
};
