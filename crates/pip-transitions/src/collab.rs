//! Capabilities the PiP core consumes from the rest of the window manager.
//!
//! Each collaborator is injected as an `Arc<dyn Trait>`; none of them holds a
//! reference back into the scheduler.

use std::{fmt, sync::Arc};

use pip_bounds::DisplayLayout;
use pip_ids::{DisplayId, SurfaceId, TaskId, TransitionHandle};

use crate::{
    AnimatorFactory, TaskInfo,
    transaction::{HierarchyTransaction, SurfaceTransaction, TransitionType},
};

/// Sequencer of window-hierarchy transitions.
///
/// After `start_transition` returns, the manager later calls back into
/// [`crate::PipTransitionRouter`] with the ready geometry.
pub trait TransitionManager: Send + Sync {
    /// Submit `txn` as a transition of `kind`.
    fn start_transition(&self, kind: TransitionType, txn: HierarchyTransaction)
    -> TransitionHandle;
}

/// Side of a split-screen pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitPosition {
    /// Let the split-screen controller choose.
    Undefined,
    /// Top or left stage.
    TopOrLeft,
    /// Bottom or right stage.
    BottomOrRight,
}

/// Handshake with the split-screen controller.
pub trait SplitScreen: Send + Sync {
    /// Whether `task` is currently hosted in a split stage.
    fn is_task_in_split_screen(&self, task: TaskId) -> bool;

    /// Add the edits needed to place `task` into split screen to `txn`.
    fn prepare_enter_split_screen(
        &self,
        txn: &mut HierarchyTransaction,
        task: &TaskInfo,
        position: SplitPosition,
    );

    /// Contribute to the finish transaction of an expand-to-split.
    fn finish_enter_split_screen(&self, finish: &mut SurfaceTransaction);
}

/// Query into the desktop-windowing controller.
pub trait DesktopWindowing: Send + Sync {
    /// Whether desktop mode is active on `display`.
    fn is_desktop_mode_active(&self, display: DisplayId) -> bool;
}

/// Read-only display metrics.
pub trait DisplayLayoutProvider: Send + Sync {
    /// Current layout of the display hosting PiP.
    fn display_layout(&self) -> DisplayLayout;
}

/// User interaction measured by [`LatencyTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Entering PiP.
    PipEnter,
    /// Animated PiP resize.
    PipResize,
    /// Expanding out of PiP.
    PipExpand,
    /// Expanding out of PiP into split screen.
    PipExpandToSplit,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PipEnter => "pip-enter",
            Self::PipResize => "pip-resize",
            Self::PipExpand => "pip-expand",
            Self::PipExpandToSplit => "pip-expand-to-split",
        };
        f.write_str(s)
    }
}

/// Fire-and-forget interaction latency telemetry.
pub trait LatencyTracker: Send + Sync {
    /// Interaction `kind` started on `surface`.
    fn begin(&self, surface: SurfaceId, kind: InteractionKind);
    /// Interaction `kind` finished.
    fn end(&self, kind: InteractionKind);
}

/// Sink for surface transactions.
pub trait SurfaceComposer: Send + Sync {
    /// Apply `txn` atomically.
    fn apply(&self, txn: SurfaceTransaction);
}

/// Every capability the PiP core needs, bundled for the composition root.
#[derive(Clone)]
pub struct Collaborators {
    /// Transition sequencer.
    pub transitions: Arc<dyn TransitionManager>,
    /// Surface transaction sink.
    pub composer: Arc<dyn SurfaceComposer>,
    /// Animator construction.
    pub animators: Arc<dyn AnimatorFactory>,
    /// Latency telemetry.
    pub latency: Arc<dyn LatencyTracker>,
    /// Display metrics.
    pub display: Arc<dyn DisplayLayoutProvider>,
    /// Split-screen controller, when present.
    pub split: Option<Arc<dyn SplitScreen>>,
    /// Desktop-windowing controller, when present.
    pub desktop: Option<Arc<dyn DesktopWindowing>>,
}
