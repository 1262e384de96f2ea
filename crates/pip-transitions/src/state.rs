//! The PiP lifecycle ledger.
//!
//! [`TransitionState`] is passive: it records the current [`PipState`], the
//! task in PiP and its pinned leash, and tells listeners about every state
//! write. Legality of a transition is decided by the scheduler, never here.

use std::{fmt, mem, sync::Arc};

use parking_lot::Mutex;
use pip_bounds::PipParams;
use pip_geom::Rect;
use pip_ids::{ComponentId, ContainerToken, DisplayId, SurfaceId, TaskId};
use tracing::debug;

/// Lifecycle of a PiP instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PipState {
    /// No PiP has happened yet.
    #[default]
    Undefined,
    /// Enter transition submitted or animating.
    EnteringPip,
    /// Settled in PiP.
    EnteredPip,
    /// Animated bounds change submitted or animating.
    ScheduledBoundsChange,
    /// Expand or remove submitted or animating.
    ExitingPip,
    /// PiP instance finished.
    ExitedPip,
}

impl PipState {
    /// True for every state of a live PiP instance.
    pub fn is_in_pip(self) -> bool {
        !matches!(self, Self::Undefined | Self::ExitedPip)
    }

    /// True while an enter, exit or bounds-change transition is active.
    pub fn is_in_transition(self) -> bool {
        matches!(
            self,
            Self::EnteringPip | Self::ScheduledBoundsChange | Self::ExitingPip
        )
    }
}

impl fmt::Display for PipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "undefined",
            Self::EnteringPip => "entering-pip",
            Self::EnteredPip => "entered-pip",
            Self::ScheduledBoundsChange => "scheduled-bounds-change",
            Self::ExitingPip => "exiting-pip",
            Self::ExitedPip => "exited-pip",
        };
        f.write_str(s)
    }
}

/// Extra data attached to a state write.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StateExtra {
    /// Nothing attached.
    #[default]
    None,
    /// Destination of a scheduled bounds change.
    BoundsChange {
        /// Target bounds.
        destination: Rect,
        /// Animation duration (ms).
        duration_ms: u64,
    },
    /// The state was rolled back after the transition manager dropped a
    /// submitted transition.
    Aborted,
}

/// Description of the task entering PiP.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskInfo {
    /// Task id.
    pub task_id: TaskId,
    /// Top activity component; owner of saved re-entry state.
    pub component: ComponentId,
    /// Display hosting the task.
    pub display: DisplayId,
    /// Bounds the task occupied before entering PiP.
    pub bounds: Rect,
    /// Task id of the container that hosted the task before PiP.
    pub last_parent_task: Option<TaskId>,
    /// Parameters the app requested PiP with.
    pub params: PipParams,
}

/// The task currently in (or entering) PiP.
#[derive(Clone, Debug, PartialEq)]
pub struct PipTask {
    /// Container animated into PiP.
    pub token: ContainerToken,
    /// Task description.
    pub info: TaskInfo,
}

/// State observer receiving `(old, new, extra)`.
pub type StateListener = Arc<dyn Fn(PipState, PipState, &StateExtra) + Send + Sync>;

/// Callback deferred until PiP is idle.
type IdleCallback = Box<dyn FnOnce() + Send>;

/// Registration token returned by [`TransitionState::add_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Lock-protected ledger fields.
struct Inner {
    /// Current lifecycle state.
    state: PipState,
    /// Task in PiP, if any.
    pip_task: Option<PipTask>,
    /// Leash of the pinned task.
    pinned_leash: Option<SurfaceId>,
    /// Observers in registration order.
    listeners: Vec<(ListenerId, StateListener)>,
    /// Next listener id.
    next_listener: u64,
    /// Callbacks waiting for [`PipState::EnteredPip`].
    idle: Vec<IdleCallback>,
}

/// Shared handle to the lifecycle ledger.
#[derive(Clone)]
pub struct TransitionState {
    /// Shared ledger.
    inner: Arc<Mutex<Inner>>,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionState {
    /// A ledger in [`PipState::Undefined`] with no task.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: PipState::Undefined,
                pip_task: None,
                pinned_leash: None,
                listeners: Vec::new(),
                next_listener: 0,
                idle: Vec::new(),
            })),
        }
    }

    /// Current state.
    pub fn state(&self) -> PipState {
        self.inner.lock().state
    }

    /// See [`PipState::is_in_pip`].
    pub fn is_in_pip(&self) -> bool {
        self.state().is_in_pip()
    }

    /// See [`PipState::is_in_transition`].
    pub fn is_in_transition(&self) -> bool {
        self.state().is_in_transition()
    }

    /// Write a new state and notify every listener in registration order.
    ///
    /// Writing [`PipState::EnteredPip`] also drains callbacks queued with
    /// [`TransitionState::run_when_idle`], after the listeners have run.
    pub fn set_state(&self, new: PipState, extra: StateExtra) {
        let (old, listeners, idle) = {
            let mut g = self.inner.lock();
            let old = g.state;
            g.state = new;
            let idle = if new == PipState::EnteredPip {
                mem::take(&mut g.idle)
            } else {
                Vec::new()
            };
            let listeners: Vec<StateListener> =
                g.listeners.iter().map(|(_, l)| l.clone()).collect();
            (old, listeners, idle)
        };
        debug!(%old, %new, ?extra, "pip state");
        for l in listeners {
            l(old, new, &extra);
        }
        for cb in idle {
            cb();
        }
    }

    /// Register an observer.
    pub fn add_listener(
        &self,
        listener: impl Fn(PipState, PipState, &StateExtra) + Send + Sync + 'static,
    ) -> ListenerId {
        let mut g = self.inner.lock();
        let id = ListenerId(g.next_listener);
        g.next_listener += 1;
        g.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Unregister an observer; unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.inner.lock().listeners.retain(|(lid, _)| *lid != id);
    }

    /// Run `cb` now when settled in PiP, otherwise on the next entry into
    /// [`PipState::EnteredPip`].
    pub fn run_when_idle(&self, cb: impl FnOnce() + Send + 'static) {
        {
            let mut g = self.inner.lock();
            if g.state != PipState::EnteredPip {
                g.idle.push(Box::new(cb));
                return;
            }
        }
        cb();
    }

    /// Task in PiP, if any.
    pub fn pip_task(&self) -> Option<PipTask> {
        self.inner.lock().pip_task.clone()
    }

    /// Container of the task in PiP, if any.
    pub fn pip_task_token(&self) -> Option<ContainerToken> {
        self.inner.lock().pip_task.as_ref().map(|t| t.token)
    }

    /// Record the task in PiP.
    pub fn set_pip_task(&self, task: PipTask) {
        self.inner.lock().pip_task = Some(task);
    }

    /// Forget the task in PiP and its leash.
    pub fn clear_pip_task(&self) {
        let mut g = self.inner.lock();
        g.pip_task = None;
        g.pinned_leash = None;
    }

    /// Leash of the pinned task, if known.
    pub fn pinned_leash(&self) -> Option<SurfaceId> {
        self.inner.lock().pinned_leash
    }

    /// Record the leash of the pinned task.
    pub fn set_pinned_leash(&self, leash: SurfaceId) {
        self.inner.lock().pinned_leash = Some(leash);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn in_pip_excludes_undefined_and_exited() {
        use PipState::*;
        for s in [EnteringPip, EnteredPip, ScheduledBoundsChange, ExitingPip] {
            assert!(s.is_in_pip(), "{s}");
        }
        assert!(!Undefined.is_in_pip());
        assert!(!ExitedPip.is_in_pip());
        assert!(!EnteredPip.is_in_transition());
    }

    #[test]
    fn listeners_run_in_registration_order_with_old_and_new() {
        let ts = TransitionState::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let s = seen.clone();
            ts.add_listener(move |old, new, _| s.lock().push((tag, old, new)));
        }
        ts.set_state(PipState::EnteringPip, StateExtra::None);
        assert_eq!(
            *seen.lock(),
            vec![
                ("a", PipState::Undefined, PipState::EnteringPip),
                ("b", PipState::Undefined, PipState::EnteringPip),
            ]
        );
    }

    #[test]
    fn set_state_is_unconditional() {
        let ts = TransitionState::new();
        ts.set_state(PipState::ExitedPip, StateExtra::None);
        ts.set_state(PipState::ScheduledBoundsChange, StateExtra::None);
        assert_eq!(ts.state(), PipState::ScheduledBoundsChange);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let ts = TransitionState::new();
        let hit = Arc::new(AtomicBool::new(false));
        let h = hit.clone();
        let id = ts.add_listener(move |_, _, _| h.store(true, Ordering::SeqCst));
        ts.remove_listener(id);
        ts.set_state(PipState::EnteredPip, StateExtra::None);
        assert!(!hit.load(Ordering::SeqCst));
    }

    #[test]
    fn idle_callback_waits_for_entered_pip() {
        let ts = TransitionState::new();
        ts.set_state(PipState::EnteringPip, StateExtra::None);
        let hit = Arc::new(AtomicBool::new(false));
        let h = hit.clone();
        ts.run_when_idle(move || h.store(true, Ordering::SeqCst));
        assert!(!hit.load(Ordering::SeqCst));
        ts.set_state(PipState::EnteredPip, StateExtra::None);
        assert!(hit.load(Ordering::SeqCst));

        let again = Arc::new(AtomicBool::new(false));
        let a = again.clone();
        ts.run_when_idle(move || a.store(true, Ordering::SeqCst));
        assert!(again.load(Ordering::SeqCst));
    }

    #[test]
    fn listener_can_write_state_reentrantly() {
        let ts = TransitionState::new();
        let inner = ts.clone();
        ts.add_listener(move |_, new, _| {
            if new == PipState::ExitingPip {
                inner.set_state(PipState::ExitedPip, StateExtra::None);
            }
        });
        ts.set_state(PipState::ExitingPip, StateExtra::None);
        assert_eq!(ts.state(), PipState::ExitedPip);
    }
}
