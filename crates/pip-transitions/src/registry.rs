//! Book-keeping of submitted transitions.

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::Mutex;
use pip_geom::Rect;
use pip_ids::TransitionHandle;
use tracing::trace;

use crate::{PipState, TransitionType};

/// What a submitted transition does, and therefore which executor runs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Enter PiP.
    Enter,
    /// Animated resize.
    Resize {
        /// Animation duration (ms).
        duration_ms: u64,
    },
    /// Dismiss PiP.
    Remove {
        /// Fade the leash out before removing.
        fade_out: bool,
    },
    /// Expand back to the task's normal bounds.
    Expand,
    /// Expand into a split-screen stage.
    ExpandToSplit,
}

impl TransitionKind {
    /// Transition type submitted to the transition manager.
    pub fn transition_type(self) -> TransitionType {
        match self {
            Self::Enter => TransitionType::EnterPip,
            Self::Resize { .. } => TransitionType::ResizePip,
            Self::Remove { .. } => TransitionType::RemovePip,
            Self::Expand => TransitionType::ExitPip,
            Self::ExpandToSplit => TransitionType::ExitPipToSplit,
        }
    }

    /// True for kinds run by the expand handler.
    pub fn is_expand(self) -> bool {
        matches!(self, Self::Expand | Self::ExpandToSplit)
    }

    /// Lifecycle state held while a transition of this kind is in flight.
    pub fn in_flight_state(self) -> PipState {
        match self {
            Self::Enter => PipState::EnteringPip,
            Self::Resize { .. } => PipState::ScheduledBoundsChange,
            Self::Remove { .. } | Self::Expand | Self::ExpandToSplit => PipState::ExitingPip,
        }
    }
}

/// Progress of one submitted transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    /// Handed to the transition manager; waiting for geometry.
    Submitted,
    /// Executor started its animator.
    Animating,
    /// Animator ended; finish work in progress.
    Finalizing,
    /// Finished.
    Done,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::Animating => "animating",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Registry entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InFlight {
    /// What the transition does.
    pub kind: TransitionKind,
    /// Bounds the submitted transaction gave the PiP container, if any.
    pub destination: Option<Rect>,
    /// Where it is.
    pub phase: TransitionPhase,
    /// A later request took over before this one started animating; when it
    /// becomes ready it is completed without animating or touching state.
    pub superseded: bool,
}

/// Shared map of submitted transitions.
#[derive(Clone, Default)]
pub struct TransitionRegistry {
    /// Entries by handle.
    entries: Arc<Mutex<HashMap<TransitionHandle, InFlight>>>,
}

impl TransitionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly submitted transition. Finished entries are pruned.
    pub fn insert(
        &self,
        handle: TransitionHandle,
        kind: TransitionKind,
        destination: Option<Rect>,
    ) {
        let mut g = self.entries.lock();
        g.retain(|_, e| e.phase != TransitionPhase::Done);
        g.insert(
            handle,
            InFlight {
                kind,
                destination,
                phase: TransitionPhase::Submitted,
                superseded: false,
            },
        );
        trace!(%handle, ?kind, "transition submitted");
    }

    /// Entry for `handle`.
    pub fn get(&self, handle: TransitionHandle) -> Option<InFlight> {
        self.entries.lock().get(&handle).copied()
    }

    /// Kind of `handle`.
    pub fn kind(&self, handle: TransitionHandle) -> Option<TransitionKind> {
        self.get(handle).map(|e| e.kind)
    }

    /// Phase of `handle`.
    pub fn phase(&self, handle: TransitionHandle) -> Option<TransitionPhase> {
        self.get(handle).map(|e| e.phase)
    }

    /// Move `handle` to `phase`; unknown handles are ignored.
    pub fn set_phase(&self, handle: TransitionHandle, phase: TransitionPhase) {
        if let Some(e) = self.entries.lock().get_mut(&handle) {
            trace!(%handle, from = %e.phase, to = %phase, "transition phase");
            e.phase = phase;
        }
    }

    /// Mark every transition still waiting for geometry as superseded.
    pub fn supersede_pending(&self) {
        for (handle, e) in self.entries.lock().iter_mut() {
            if e.phase == TransitionPhase::Submitted && !e.superseded {
                trace!(%handle, "transition superseded");
                e.superseded = true;
            }
        }
    }

    /// Forget `handle`, returning its entry.
    pub fn remove(&self, handle: TransitionHandle) -> Option<InFlight> {
        self.entries.lock().remove(&handle)
    }

    /// Number of transitions not yet done.
    pub fn active_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| e.phase != TransitionPhase::Done)
            .count()
    }
}
