//! Simulated window-manager collaborators.

use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use pip_bounds::DisplayLayout;
use pip_ids::{DisplayId, SurfaceId, TaskId, TransitionHandle};
use pip_transitions::{
    DesktopWindowing, DisplayLayoutProvider, HierarchyTransaction, InteractionKind,
    LatencyTracker, SplitPosition, SplitScreen, SurfaceComposer, SurfaceOp, SurfaceTransaction,
    TaskInfo, TransitionManager, TransitionType,
};
use tracing::{debug, info, trace};

/// A transition waiting for its geometry.
#[derive(Clone, Debug)]
pub struct Pending {
    /// Handle returned to the scheduler.
    pub handle: TransitionHandle,
    /// Requested type.
    pub kind: TransitionType,
    /// Submitted hierarchy edits.
    pub txn: HierarchyTransaction,
}

/// Transition manager that queues submissions until a `deliver` step.
#[derive(Default)]
pub struct SimTransitionManager {
    /// Last issued handle.
    next: AtomicU64,
    /// Submissions in order.
    pending: Mutex<VecDeque<Pending>>,
}

impl SimTransitionManager {
    /// Take the oldest pending transition.
    pub fn pop(&self) -> Option<Pending> {
        self.pending.lock().pop_front()
    }

    /// Number of transitions waiting for geometry.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl TransitionManager for SimTransitionManager {
    fn start_transition(&self, kind: TransitionType, txn: HierarchyTransaction) -> TransitionHandle {
        let handle = TransitionHandle::new(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        info!(%handle, %kind, changes = txn.changes().len(), "transition submitted");
        self.pending.lock().push_back(Pending { handle, kind, txn });
        handle
    }
}

/// Composer that tracks the last opacity per surface and counts frames.
#[derive(Default)]
pub struct SimComposer {
    /// Transactions applied.
    applied: AtomicU64,
    /// Last alpha written per surface.
    alpha: Mutex<HashMap<SurfaceId, f32>>,
}

impl SimComposer {
    /// Number of transactions applied.
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    /// Last alpha written to `surface`.
    pub fn alpha(&self, surface: SurfaceId) -> Option<f32> {
        self.alpha.lock().get(&surface).copied()
    }
}

impl SurfaceComposer for SimComposer {
    fn apply(&self, txn: SurfaceTransaction) {
        self.applied.fetch_add(1, Ordering::SeqCst);
        trace!(ops = txn.ops().len(), "surface transaction");
        let mut alpha = self.alpha.lock();
        for op in txn.ops() {
            if let SurfaceOp::SetAlpha { surface, alpha: a } = op {
                alpha.insert(*surface, *a);
            }
        }
    }
}

/// Latency tracker writing to the log.
pub struct SimLatency;

impl LatencyTracker for SimLatency {
    fn begin(&self, surface: SurfaceId, kind: InteractionKind) {
        debug!(%surface, %kind, "interaction begin");
    }

    fn end(&self, kind: InteractionKind) {
        debug!(%kind, "interaction end");
    }
}

/// Fixed display.
pub struct SimDisplay(pub DisplayLayout);

impl DisplayLayoutProvider for SimDisplay {
    fn display_layout(&self) -> DisplayLayout {
        self.0.clone()
    }
}

/// Split-screen controller hosting at most one task.
pub struct SimSplit {
    /// Task hosted in a split stage.
    pub hosted: Option<TaskId>,
}

impl SplitScreen for SimSplit {
    fn is_task_in_split_screen(&self, task: TaskId) -> bool {
        self.hosted == Some(task)
    }

    fn prepare_enter_split_screen(
        &self,
        _txn: &mut HierarchyTransaction,
        task: &TaskInfo,
        position: SplitPosition,
    ) {
        info!(task = %task.task_id, ?position, "preparing split screen");
    }

    fn finish_enter_split_screen(&self, _finish: &mut SurfaceTransaction) {
        info!("split screen entered");
    }
}

/// Desktop-windowing controller with a fixed answer.
pub struct SimDesktop(pub bool);

impl DesktopWindowing for SimDesktop {
    fn is_desktop_mode_active(&self, _display: DisplayId) -> bool {
        self.0
    }
}
